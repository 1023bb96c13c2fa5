//! Training record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::{TrainingRecord, TrainingStatus};

const TRAINING_COLUMNS: &str = "id, staff_id, training_type, completion_date, expiry_date, \
     status, notes, attachments, created_at, updated_at";

fn training_from_row(row: &Row<'_>) -> rusqlite::Result<TrainingRow> {
    Ok(TrainingRow {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        training_type: row.get(2)?,
        completion_date: row.get(3)?,
        expiry_date: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        attachments: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Database {
    /// Insert a new training record.
    pub fn insert_training_record(&self, record: &TrainingRecord) -> DbResult<()> {
        let attachments_json = serde_json::to_string(&record.attachments)?;

        self.conn.execute(
            r#"
            INSERT INTO training_records (
                id, staff_id, training_type, completion_date, expiry_date,
                status, notes, attachments, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.id,
                record.staff_id,
                record.training_type,
                format_date(record.completion_date),
                format_date(record.expiry_date),
                training_status_to_string(&record.status),
                record.notes,
                attachments_json,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing training record.
    pub fn update_training_record(&self, record: &TrainingRecord) -> DbResult<bool> {
        let attachments_json = serde_json::to_string(&record.attachments)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE training_records SET
                training_type = ?2,
                completion_date = ?3,
                expiry_date = ?4,
                status = ?5,
                notes = ?6,
                attachments = ?7,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                record.id,
                record.training_type,
                format_date(record.completion_date),
                format_date(record.expiry_date),
                training_status_to_string(&record.status),
                record.notes,
                attachments_json,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Persist just a recomputed status (bulk refresh path).
    pub fn set_training_status(&self, id: &str, status: TrainingStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE training_records
             SET status = ?2, updated_at = datetime('now')
             WHERE id = ?1",
            params![id, training_status_to_string(&status)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a training record by id.
    pub fn get_training_record(&self, id: &str) -> DbResult<Option<TrainingRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {TRAINING_COLUMNS} FROM training_records WHERE id = ?"),
                [id],
                training_from_row,
            )
            .optional()?
            .map(TrainingRecord::try_from)
            .transpose()
    }

    /// List all training records.
    pub fn list_training_records(&self) -> DbResult<Vec<TrainingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRAINING_COLUMNS} FROM training_records ORDER BY expiry_date"
        ))?;
        let rows = stmt.query_map([], training_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// List training records for one staff member.
    pub fn list_training_records_for_staff(&self, staff_id: &str) -> DbResult<Vec<TrainingRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRAINING_COLUMNS} FROM training_records WHERE staff_id = ? ORDER BY expiry_date"
        ))?;
        let rows = stmt.query_map([staff_id], training_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// Delete a training record.
    pub fn delete_training_record(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM training_records WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct TrainingRow {
    id: String,
    staff_id: String,
    training_type: String,
    completion_date: String,
    expiry_date: String,
    status: String,
    notes: Option<String>,
    attachments: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TrainingRow> for TrainingRecord {
    type Error = DbError;

    fn try_from(row: TrainingRow) -> Result<Self, Self::Error> {
        let attachments: Vec<String> = serde_json::from_str(&row.attachments)?;
        Ok(TrainingRecord {
            id: row.id,
            staff_id: row.staff_id,
            training_type: row.training_type,
            completion_date: parse_date(&row.completion_date)?,
            expiry_date: parse_date(&row.expiry_date)?,
            status: string_to_training_status(&row.status)?,
            notes: row.notes,
            attachments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn training_status_to_string(status: &TrainingStatus) -> &'static str {
    match status {
        TrainingStatus::Valid => "valid",
        TrainingStatus::ExpiringSoon => "expiring_soon",
        TrainingStatus::Expired => "expired",
    }
}

fn string_to_training_status(s: &str) -> Result<TrainingStatus, DbError> {
    match s {
        "valid" => Ok(TrainingStatus::Valid),
        "expiring_soon" => Ok(TrainingStatus::ExpiringSoon),
        "expired" => Ok(TrainingStatus::Expired),
        _ => Err(DbError::Constraint(format!(
            "Unknown training status: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffProfile;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_db() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let staff = StaffProfile::new(
            "Pat Reed".into(),
            "pat@example.com".into(),
            "Care Assistant".into(),
            "Care".into(),
            day(2022, 1, 10),
        );
        db.insert_staff_profile(&staff).unwrap();
        (db, staff.id)
    }

    fn make_record(staff_id: &str, expiry: NaiveDate) -> TrainingRecord {
        TrainingRecord::new(
            staff_id.to_string(),
            "First Aid".into(),
            day(2024, 1, 10),
            expiry,
            day(2024, 6, 15),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let (db, staff_id) = setup_db();
        let record = make_record(&staff_id, day(2025, 1, 10));
        db.insert_training_record(&record).unwrap();

        let retrieved = db.get_training_record(&record.id).unwrap().unwrap();
        assert_eq!(retrieved.training_type, "First Aid");
        assert_eq!(retrieved.status, TrainingStatus::Valid);
        assert_eq!(retrieved.expiry_date, day(2025, 1, 10));
    }

    #[test]
    fn test_set_status_only() {
        let (db, staff_id) = setup_db();
        let record = make_record(&staff_id, day(2025, 1, 10));
        db.insert_training_record(&record).unwrap();

        assert!(db
            .set_training_status(&record.id, TrainingStatus::Expired)
            .unwrap());

        let retrieved = db.get_training_record(&record.id).unwrap().unwrap();
        assert_eq!(retrieved.status, TrainingStatus::Expired);
        // Nothing else moved
        assert_eq!(retrieved.expiry_date, record.expiry_date);
        assert_eq!(retrieved.training_type, record.training_type);
    }

    #[test]
    fn test_list_for_staff() {
        let (db, staff_id) = setup_db();
        db.insert_training_record(&make_record(&staff_id, day(2025, 1, 10)))
            .unwrap();

        assert_eq!(db.list_training_records_for_staff(&staff_id).unwrap().len(), 1);
        assert!(db
            .list_training_records_for_staff("other")
            .unwrap()
            .is_empty());
    }
}
