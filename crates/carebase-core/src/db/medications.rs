//! Medication database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Medication, MedicationStatus, Schedule, Stock};

const MEDICATION_COLUMNS: &str = "id, client_id, medication_name, caregiver_name, status, \
     frequency, times, quantity, threshold, attachments, created_at, updated_at";

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        client_id: row.get(1)?,
        medication_name: row.get(2)?,
        caregiver_name: row.get(3)?,
        status: row.get(4)?,
        frequency: row.get(5)?,
        times: row.get(6)?,
        quantity: row.get(7)?,
        threshold: row.get(8)?,
        attachments: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl Database {
    /// Insert a new medication.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        let times_json = serde_json::to_string(&medication.schedule.times)?;
        let attachments_json = serde_json::to_string(&medication.attachments)?;

        self.conn.execute(
            r#"
            INSERT INTO medications (
                id, client_id, medication_name, caregiver_name, status,
                frequency, times, quantity, threshold, attachments,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                medication.id,
                medication.client_id,
                medication.medication_name,
                medication.caregiver_name,
                medication_status_to_string(&medication.status),
                medication.schedule.frequency,
                times_json,
                medication.stock.quantity,
                medication.stock.threshold,
                attachments_json,
                medication.created_at,
                medication.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing medication's descriptive fields and stock levels.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        let times_json = serde_json::to_string(&medication.schedule.times)?;
        let attachments_json = serde_json::to_string(&medication.attachments)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                client_id = ?2,
                medication_name = ?3,
                caregiver_name = ?4,
                status = ?5,
                frequency = ?6,
                times = ?7,
                quantity = ?8,
                threshold = ?9,
                attachments = ?10,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.client_id,
                medication.medication_name,
                medication.caregiver_name,
                medication_status_to_string(&medication.status),
                medication.schedule.frequency,
                times_json,
                medication.stock.quantity,
                medication.stock.threshold,
                attachments_json,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a medication by id.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                &format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?"),
                [id],
                medication_from_row,
            )
            .optional()?
            .map(Medication::try_from)
            .transpose()
    }

    /// List all medications.
    pub fn list_medications(&self) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], medication_from_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// List medications for one client.
    pub fn list_medications_for_client(&self, client_id: &str) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE client_id = ? ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([client_id], medication_from_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// List medications whose owning client is in the given set.
    pub fn list_medications_for_clients(&self, client_ids: &[String]) -> DbResult<Vec<Medication>> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = client_ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE client_id IN ({}) ORDER BY created_at DESC",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(client_ids.iter()),
            medication_from_row,
        )?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// List medications below their threshold. Low-stock is computed in the
    /// query, never stored.
    pub fn list_low_stock_medications(&self) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE quantity < threshold ORDER BY quantity"
        ))?;
        let rows = stmt.query_map([], medication_from_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// Delete a medication (administrations cascade).
    pub fn delete_medication(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct MedicationRow {
    id: String,
    client_id: String,
    medication_name: String,
    caregiver_name: String,
    status: String,
    frequency: Option<String>,
    times: String,
    quantity: u32,
    threshold: u32,
    attachments: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        let times: Vec<String> = serde_json::from_str(&row.times)?;
        let attachments: Vec<String> = serde_json::from_str(&row.attachments)?;
        let status = string_to_medication_status(&row.status)?;

        Ok(Medication {
            id: row.id,
            client_id: row.client_id,
            medication_name: row.medication_name,
            caregiver_name: row.caregiver_name,
            status,
            schedule: Schedule {
                frequency: row.frequency,
                times,
            },
            stock: Stock {
                quantity: row.quantity,
                threshold: row.threshold,
            },
            attachments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn medication_status_to_string(status: &MedicationStatus) -> &'static str {
    match status {
        MedicationStatus::Pending => "pending",
        MedicationStatus::Completed => "completed",
    }
}

pub(crate) fn string_to_medication_status(s: &str) -> Result<MedicationStatus, DbError> {
    match s {
        "pending" => Ok(MedicationStatus::Pending),
        "completed" => Ok(MedicationStatus::Completed),
        _ => Err(DbError::Constraint(format!(
            "Unknown medication status: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Client;
    use chrono::NaiveDate;

    fn setup_db() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let client = Client::new(
            "Edith Moore".into(),
            84,
            "12".into(),
            "Residential".into(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        db.insert_client(&client).unwrap();
        (db, client.id)
    }

    fn make_medication(client_id: &str, name: &str, quantity: u32, threshold: u32) -> Medication {
        let mut medication =
            Medication::new(client_id.to_string(), name.into(), "Sam Field".into());
        medication.stock = Stock {
            quantity,
            threshold,
        };
        medication
    }

    #[test]
    fn test_insert_and_get() {
        let (db, client_id) = setup_db();

        let mut medication = make_medication(&client_id, "Paracetamol 500mg", 20, 5);
        medication.schedule = Schedule {
            frequency: Some("Twice daily".into()),
            times: vec!["08:00".into(), "20:00".into()],
        };
        db.insert_medication(&medication).unwrap();

        let retrieved = db.get_medication(&medication.id).unwrap().unwrap();
        assert_eq!(retrieved.medication_name, "Paracetamol 500mg");
        assert_eq!(retrieved.stock.quantity, 20);
        assert_eq!(retrieved.schedule.times.len(), 2);
        assert_eq!(retrieved.status, MedicationStatus::Pending);
    }

    #[test]
    fn test_missing_client_rejected() {
        let (db, _) = setup_db();
        let medication = make_medication("no-such-client", "Paracetamol", 20, 5);
        assert!(db.insert_medication(&medication).is_err());
    }

    #[test]
    fn test_list_for_clients() {
        let (db, client_id) = setup_db();
        let other = Client::new(
            "Ron Pike".into(),
            79,
            "13".into(),
            "Nursing".into(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        );
        db.insert_client(&other).unwrap();

        db.insert_medication(&make_medication(&client_id, "Paracetamol", 20, 5))
            .unwrap();
        db.insert_medication(&make_medication(&other.id, "Ibuprofen", 10, 5))
            .unwrap();

        let scoped = db
            .list_medications_for_clients(&[client_id.clone()])
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].client_id, client_id);

        assert!(db.list_medications_for_clients(&[]).unwrap().is_empty());
        assert_eq!(db.list_medications().unwrap().len(), 2);
    }

    #[test]
    fn test_low_stock_query() {
        let (db, client_id) = setup_db();

        db.insert_medication(&make_medication(&client_id, "Plenty", 20, 5))
            .unwrap();
        db.insert_medication(&make_medication(&client_id, "Scarce", 2, 5))
            .unwrap();
        // At threshold is not low
        db.insert_medication(&make_medication(&client_id, "Boundary", 5, 5))
            .unwrap();

        let low = db.list_low_stock_medications().unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].medication_name, "Scarce");
    }
}
