//! Administration records and the stock ledger arithmetic.
//!
//! Stock moves are single-statement atomic updates (`MAX(0, quantity - 1)`)
//! executed in the same transaction as the history row, so the counter and
//! the event commit together or not at all.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::{Administration, DoseRecord};

const ADMINISTRATION_COLUMNS: &str =
    "id, medication_id, client_id, date, time, given, caregiver, notes, created_at";

fn administration_from_row(row: &Row<'_>) -> rusqlite::Result<AdministrationRow> {
    Ok(AdministrationRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        client_id: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        given: row.get(5)?,
        caregiver: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn get_administration_on(conn: &Connection, id: &str) -> DbResult<Option<Administration>> {
    conn.query_row(
        &format!("SELECT {ADMINISTRATION_COLUMNS} FROM administrations WHERE id = ?"),
        [id],
        administration_from_row,
    )
    .optional()?
    .map(Administration::try_from)
    .transpose()
}

/// Move stock by one unit, flooring at zero on the way down.
fn adjust_stock(conn: &Connection, medication_id: &str, delta: i64) -> DbResult<usize> {
    let rows = conn.execute(
        "UPDATE medications
         SET quantity = MAX(0, quantity + ?1), updated_at = datetime('now')
         WHERE id = ?2",
        params![delta, medication_id],
    )?;
    Ok(rows)
}

/// Recompute the medication status from whether any given dose remains.
fn refresh_medication_status(conn: &Connection, medication_id: &str) -> DbResult<()> {
    conn.execute(
        "UPDATE medications
         SET status = CASE
                 WHEN EXISTS (SELECT 1 FROM administrations
                              WHERE medication_id = ?1 AND given = 1)
                 THEN 'completed' ELSE 'pending'
             END,
             updated_at = datetime('now')
         WHERE id = ?1",
        [medication_id],
    )?;
    Ok(())
}

impl Database {
    /// Record an administration event against a medication.
    ///
    /// Given doses decrement stock by exactly one (floored at zero) and mark
    /// the medication Completed; refused doses leave stock alone and return
    /// the status to Pending.
    pub fn record_administration(&mut self, administration: &Administration) -> DbResult<()> {
        let tx = self.transaction()?;

        let rows = if administration.given {
            tx.execute(
                "UPDATE medications
                 SET quantity = MAX(0, quantity - 1),
                     status = 'completed',
                     updated_at = datetime('now')
                 WHERE id = ?",
                [&administration.medication_id],
            )?
        } else {
            tx.execute(
                "UPDATE medications
                 SET status = 'pending', updated_at = datetime('now')
                 WHERE id = ?",
                [&administration.medication_id],
            )?
        };
        if rows == 0 {
            return Err(DbError::NotFound(format!(
                "Medication {}",
                administration.medication_id
            )));
        }

        tx.execute(
            r#"
            INSERT INTO administrations (
                id, medication_id, client_id, date, time, given, caregiver,
                notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                administration.id,
                administration.medication_id,
                administration.client_id,
                format_date(administration.date),
                administration.time,
                administration.given,
                administration.caregiver,
                administration.notes,
                administration.created_at,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Amend a recorded administration.
    ///
    /// Exactly one unit of stock moves per given-flag flip: true→false
    /// restores one, false→true consumes one. Repeating an amend with the
    /// same flag moves nothing.
    pub fn amend_administration(&mut self, id: &str, dose: &DoseRecord) -> DbResult<Administration> {
        let tx = self.transaction()?;

        let existing = get_administration_on(&tx, id)?
            .ok_or_else(|| DbError::NotFound(format!("Administration {}", id)))?;

        if existing.given && !dose.given {
            adjust_stock(&tx, &existing.medication_id, 1)?;
        } else if !existing.given && dose.given {
            adjust_stock(&tx, &existing.medication_id, -1)?;
        }

        tx.execute(
            r#"
            UPDATE administrations SET
                date = ?2, time = ?3, given = ?4, caregiver = ?5, notes = ?6
            WHERE id = ?1
            "#,
            params![
                id,
                format_date(dose.date),
                dose.time,
                dose.given,
                dose.caregiver,
                dose.notes,
            ],
        )?;

        refresh_medication_status(&tx, &existing.medication_id)?;

        let amended = get_administration_on(&tx, id)?
            .ok_or_else(|| DbError::NotFound(format!("Administration {}", id)))?;

        tx.commit()?;
        Ok(amended)
    }

    /// Delete an administration, restoring one unit of stock if the removed
    /// event had been given. Returns the removed record.
    pub fn delete_administration(&mut self, id: &str) -> DbResult<Administration> {
        let tx = self.transaction()?;

        let existing = get_administration_on(&tx, id)?
            .ok_or_else(|| DbError::NotFound(format!("Administration {}", id)))?;

        tx.execute("DELETE FROM administrations WHERE id = ?", [id])?;

        if existing.given {
            adjust_stock(&tx, &existing.medication_id, 1)?;
        }
        refresh_medication_status(&tx, &existing.medication_id)?;

        tx.commit()?;
        Ok(existing)
    }

    /// Get an administration by id.
    pub fn get_administration(&self, id: &str) -> DbResult<Option<Administration>> {
        get_administration_on(&self.conn, id)
    }

    /// List all administrations, most recent first.
    pub fn list_administrations(&self) -> DbResult<Vec<Administration>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ADMINISTRATION_COLUMNS} FROM administrations ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], administration_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// List administrations whose owning client is in the given set.
    pub fn list_administrations_for_clients(
        &self,
        client_ids: &[String],
    ) -> DbResult<Vec<Administration>> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = client_ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {ADMINISTRATION_COLUMNS} FROM administrations WHERE client_id IN ({}) ORDER BY created_at DESC",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(client_ids.iter()),
            administration_from_row,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// Administration history for one medication, in recorded order.
    pub fn list_administrations_for_medication(
        &self,
        medication_id: &str,
    ) -> DbResult<Vec<Administration>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ADMINISTRATION_COLUMNS} FROM administrations WHERE medication_id = ? ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map([medication_id], administration_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }
}

/// Intermediate row struct for database mapping.
struct AdministrationRow {
    id: String,
    medication_id: String,
    client_id: String,
    date: String,
    time: String,
    given: bool,
    caregiver: String,
    notes: Option<String>,
    created_at: String,
}

impl TryFrom<AdministrationRow> for Administration {
    type Error = DbError;

    fn try_from(row: AdministrationRow) -> Result<Self, Self::Error> {
        Ok(Administration {
            id: row.id,
            medication_id: row.medication_id,
            client_id: row.client_id,
            date: parse_date(&row.date)?,
            time: row.time,
            given: row.given,
            caregiver: row.caregiver,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
