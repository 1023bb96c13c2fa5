//! Audit trail database operations.
//!
//! The `audit_log` table is append-only: a schema trigger aborts any UPDATE,
//! so entries can only ever be inserted or (by an Admin, re-audited) deleted.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::AuditEntry;

const AUDIT_COLUMNS: &str = "id, actor, action, target_type, target_id, client_id, detail, timestamp";

fn audit_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get(0)?,
        actor: row.get(1)?,
        action: row.get(2)?,
        target_type: row.get(3)?,
        target_id: row.get(4)?,
        client_id: row.get(5)?,
        detail: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

impl Database {
    /// Append an audit entry.
    pub fn insert_audit_entry(&self, entry: &AuditEntry) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO audit_log (
                id, actor, action, target_type, target_id, client_id, detail,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                entry.id,
                entry.actor,
                entry.action,
                entry.target_type,
                entry.target_id,
                entry.client_id,
                entry.detail,
                entry.timestamp,
            ],
        )?;
        Ok(())
    }

    /// Get an audit entry by id.
    pub fn get_audit_entry(&self, id: &str) -> DbResult<Option<AuditEntry>> {
        self.conn
            .query_row(
                &format!("SELECT {AUDIT_COLUMNS} FROM audit_log WHERE id = ?"),
                [id],
                audit_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List audit entries, newest first, optionally filtered by target type.
    pub fn list_audit_entries(&self, target_type: Option<&str>) -> DbResult<Vec<AuditEntry>> {
        match target_type {
            Some(target) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE target_type = ? ORDER BY timestamp DESC, id"
                ))?;
                let rows = stmt.query_map([target], audit_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY timestamp DESC, id"
                ))?;
                let rows = stmt.query_map([], audit_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
            }
        }
    }

    /// List audit entries whose related client is in the given set.
    pub fn list_audit_entries_for_clients(
        &self,
        client_ids: &[String],
        target_type: Option<&str>,
    ) -> DbResult<Vec<AuditEntry>> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = client_ids.iter().map(|_| "?").collect();
        let mut sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_log WHERE client_id IN ({})",
            placeholders.join(", ")
        );
        if target_type.is_some() {
            sql.push_str(" AND target_type = ?");
        }
        sql.push_str(" ORDER BY timestamp DESC, id");

        let mut args: Vec<&str> = client_ids.iter().map(String::as_str).collect();
        if let Some(target) = target_type {
            args.push(target);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), audit_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an audit entry. The policy layer restricts this to Admins and
    /// records the deletion as a fresh entry.
    pub fn delete_audit_entry(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM audit_log WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(action: &str, target_type: &str, client: Option<&str>) -> AuditEntry {
        let mut entry = AuditEntry::new(
            "admin@example.com".into(),
            action.into(),
            target_type.into(),
            "t1".into(),
        );
        if let Some(client_id) = client {
            entry = entry.with_client(client_id);
        }
        entry
    }

    #[test]
    fn test_append_and_list() {
        let db = Database::open_in_memory().unwrap();

        db.insert_audit_entry(&make_entry("Created medication", "Medication", Some("c1")))
            .unwrap();
        db.insert_audit_entry(&make_entry("Created care plan", "CarePlan", Some("c2")))
            .unwrap();

        assert_eq!(db.list_audit_entries(None).unwrap().len(), 2);
        let meds = db.list_audit_entries(Some("Medication")).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].action, "Created medication");
    }

    #[test]
    fn test_client_scoped_listing() {
        let db = Database::open_in_memory().unwrap();

        db.insert_audit_entry(&make_entry("Created medication", "Medication", Some("c1")))
            .unwrap();
        db.insert_audit_entry(&make_entry("Updated medication", "Medication", Some("c2")))
            .unwrap();
        db.insert_audit_entry(&make_entry("Purged audit log", "AuditLog", None))
            .unwrap();

        let scoped = db
            .list_audit_entries_for_clients(&["c1".to_string()], None)
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].client_id.as_deref(), Some("c1"));

        assert!(db
            .list_audit_entries_for_clients(&[], None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_entries_cannot_be_updated() {
        let db = Database::open_in_memory().unwrap();
        let entry = make_entry("Created medication", "Medication", None);
        db.insert_audit_entry(&entry).unwrap();

        let result = db.conn().execute(
            "UPDATE audit_log SET action = 'tampered' WHERE id = ?",
            [&entry.id],
        );
        assert!(result.is_err());

        let stored = db.get_audit_entry(&entry.id).unwrap().unwrap();
        assert_eq!(stored.action, "Created medication");
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::open_in_memory().unwrap();
        let entry = make_entry("Created medication", "Medication", None);
        db.insert_audit_entry(&entry).unwrap();

        assert!(db.delete_audit_entry(&entry.id).unwrap());
        assert!(db.get_audit_entry(&entry.id).unwrap().is_none());
        assert!(!db.delete_audit_entry(&entry.id).unwrap());
    }
}
