//! Staff profile database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::StaffProfile;

const STAFF_COLUMNS: &str = "id, full_name, email, position, department, start_date, \
     care_setting, contact_number, address, dbs_status, right_to_work_status, created_at, updated_at";

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<StaffRow> {
    Ok(StaffRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        position: row.get(3)?,
        department: row.get(4)?,
        start_date: row.get(5)?,
        care_setting: row.get(6)?,
        contact_number: row.get(7)?,
        address: row.get(8)?,
        dbs_status: row.get(9)?,
        right_to_work_status: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl Database {
    /// Insert a new staff profile.
    pub fn insert_staff_profile(&self, staff: &StaffProfile) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO staff_profiles (
                id, full_name, email, position, department, start_date,
                care_setting, contact_number, address, dbs_status,
                right_to_work_status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                staff.id,
                staff.full_name,
                staff.email,
                staff.position,
                staff.department,
                format_date(staff.start_date),
                staff.care_setting,
                staff.contact_number,
                staff.address,
                staff.dbs_status,
                staff.right_to_work_status,
                staff.created_at,
                staff.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing staff profile.
    pub fn update_staff_profile(&self, staff: &StaffProfile) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE staff_profiles SET
                full_name = ?2,
                email = ?3,
                position = ?4,
                department = ?5,
                start_date = ?6,
                care_setting = ?7,
                contact_number = ?8,
                address = ?9,
                dbs_status = ?10,
                right_to_work_status = ?11,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                staff.id,
                staff.full_name,
                staff.email,
                staff.position,
                staff.department,
                format_date(staff.start_date),
                staff.care_setting,
                staff.contact_number,
                staff.address,
                staff.dbs_status,
                staff.right_to_work_status,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a staff profile by id.
    pub fn get_staff_profile(&self, id: &str) -> DbResult<Option<StaffProfile>> {
        self.conn
            .query_row(
                &format!("SELECT {STAFF_COLUMNS} FROM staff_profiles WHERE id = ?"),
                [id],
                staff_from_row,
            )
            .optional()?
            .map(StaffProfile::try_from)
            .transpose()
    }

    /// List all staff profiles.
    pub fn list_staff_profiles(&self) -> DbResult<Vec<StaffProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff_profiles ORDER BY full_name"
        ))?;
        let rows = stmt.query_map([], staff_from_row)?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?.try_into()?);
        }
        Ok(profiles)
    }

    /// Delete a staff profile.
    pub fn delete_staff_profile(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM staff_profiles WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct StaffRow {
    id: String,
    full_name: String,
    email: String,
    position: String,
    department: String,
    start_date: String,
    care_setting: Option<String>,
    contact_number: Option<String>,
    address: Option<String>,
    dbs_status: Option<String>,
    right_to_work_status: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<StaffRow> for StaffProfile {
    type Error = DbError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(StaffProfile {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            position: row.position,
            department: row.department,
            start_date: parse_date(&row.start_date)?,
            care_setting: row.care_setting,
            contact_number: row.contact_number,
            address: row.address,
            dbs_status: row.dbs_status,
            right_to_work_status: row.right_to_work_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_staff(name: &str, email: &str) -> StaffProfile {
        StaffProfile::new(
            name.into(),
            email.into(),
            "Care Assistant".into(),
            "Care".into(),
            NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let mut staff = make_staff("Pat Reed", "pat@example.com");
        staff.dbs_status = Some("Clear".into());
        db.insert_staff_profile(&staff).unwrap();

        let retrieved = db.get_staff_profile(&staff.id).unwrap().unwrap();
        assert_eq!(retrieved.full_name, "Pat Reed");
        assert_eq!(retrieved.dbs_status, Some("Clear".into()));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_staff_profile(&make_staff("Pat Reed", "pat@example.com"))
            .unwrap();
        let result = db.insert_staff_profile(&make_staff("Pat Reed II", "pat@example.com"));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let mut staff = make_staff("Pat Reed", "pat@example.com");
        db.insert_staff_profile(&staff).unwrap();

        staff.position = "Senior Care Assistant".into();
        assert!(db.update_staff_profile(&staff).unwrap());
        let retrieved = db.get_staff_profile(&staff.id).unwrap().unwrap();
        assert_eq!(retrieved.position, "Senior Care Assistant");

        assert!(db.delete_staff_profile(&staff.id).unwrap());
        assert!(db.get_staff_profile(&staff.id).unwrap().is_none());
    }
}
