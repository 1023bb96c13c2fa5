//! Care plan database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::{CarePlan, PlanStatus};

const CARE_PLAN_COLUMNS: &str = "id, client_id, plan_type, creation_date, review_date, details, \
     care_setting, status, signature, decline_reason, attachments, created_at, updated_at";

fn care_plan_from_row(row: &Row<'_>) -> rusqlite::Result<CarePlanRow> {
    Ok(CarePlanRow {
        id: row.get(0)?,
        client_id: row.get(1)?,
        plan_type: row.get(2)?,
        creation_date: row.get(3)?,
        review_date: row.get(4)?,
        details: row.get(5)?,
        care_setting: row.get(6)?,
        status: row.get(7)?,
        signature: row.get(8)?,
        decline_reason: row.get(9)?,
        attachments: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl Database {
    /// Insert a new care plan.
    pub fn insert_care_plan(&self, plan: &CarePlan) -> DbResult<()> {
        let attachments_json = serde_json::to_string(&plan.attachments)?;

        self.conn.execute(
            r#"
            INSERT INTO care_plans (
                id, client_id, plan_type, creation_date, review_date, details,
                care_setting, status, signature, decline_reason, attachments,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                plan.id,
                plan.client_id,
                plan.plan_type,
                format_date(plan.creation_date),
                plan.review_date.map(format_date),
                plan.details,
                plan.care_setting,
                plan_status_to_string(&plan.status),
                plan.signature,
                plan.decline_reason,
                attachments_json,
                plan.created_at,
                plan.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing care plan.
    pub fn update_care_plan(&self, plan: &CarePlan) -> DbResult<bool> {
        let attachments_json = serde_json::to_string(&plan.attachments)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE care_plans SET
                plan_type = ?2,
                creation_date = ?3,
                review_date = ?4,
                details = ?5,
                care_setting = ?6,
                status = ?7,
                signature = ?8,
                decline_reason = ?9,
                attachments = ?10,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                plan.id,
                plan.plan_type,
                format_date(plan.creation_date),
                plan.review_date.map(format_date),
                plan.details,
                plan.care_setting,
                plan_status_to_string(&plan.status),
                plan.signature,
                plan.decline_reason,
                attachments_json,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a care plan by id.
    pub fn get_care_plan(&self, id: &str) -> DbResult<Option<CarePlan>> {
        self.conn
            .query_row(
                &format!("SELECT {CARE_PLAN_COLUMNS} FROM care_plans WHERE id = ?"),
                [id],
                care_plan_from_row,
            )
            .optional()?
            .map(CarePlan::try_from)
            .transpose()
    }

    /// List all care plans.
    pub fn list_care_plans(&self) -> DbResult<Vec<CarePlan>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARE_PLAN_COLUMNS} FROM care_plans ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], care_plan_from_row)?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.try_into()?);
        }
        Ok(plans)
    }

    /// List care plans whose owning client is in the given set.
    pub fn list_care_plans_for_clients(&self, client_ids: &[String]) -> DbResult<Vec<CarePlan>> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = client_ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {CARE_PLAN_COLUMNS} FROM care_plans WHERE client_id IN ({}) ORDER BY created_at DESC",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(client_ids.iter()),
            care_plan_from_row,
        )?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.try_into()?);
        }
        Ok(plans)
    }

    /// Delete a care plan.
    pub fn delete_care_plan(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM care_plans WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct CarePlanRow {
    id: String,
    client_id: String,
    plan_type: String,
    creation_date: String,
    review_date: Option<String>,
    details: Option<String>,
    care_setting: Option<String>,
    status: String,
    signature: Option<String>,
    decline_reason: Option<String>,
    attachments: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CarePlanRow> for CarePlan {
    type Error = DbError;

    fn try_from(row: CarePlanRow) -> Result<Self, Self::Error> {
        let attachments: Vec<String> = serde_json::from_str(&row.attachments)?;
        Ok(CarePlan {
            id: row.id,
            client_id: row.client_id,
            plan_type: row.plan_type,
            creation_date: parse_date(&row.creation_date)?,
            review_date: row.review_date.as_deref().map(parse_date).transpose()?,
            details: row.details,
            care_setting: row.care_setting,
            status: string_to_plan_status(&row.status)?,
            signature: row.signature,
            decline_reason: row.decline_reason,
            attachments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn plan_status_to_string(status: &PlanStatus) -> &'static str {
    match status {
        PlanStatus::Pending => "pending",
        PlanStatus::Accepted => "accepted",
        PlanStatus::Declined => "declined",
    }
}

fn string_to_plan_status(s: &str) -> Result<PlanStatus, DbError> {
    match s {
        "pending" => Ok(PlanStatus::Pending),
        "accepted" => Ok(PlanStatus::Accepted),
        "declined" => Ok(PlanStatus::Declined),
        _ => Err(DbError::Constraint(format!("Unknown plan status: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, PlanDecision};
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

    fn make_plan(client_id: &str) -> CarePlan {
        CarePlan::new(
            client_id.to_string(),
            "Nutrition & Hydration".into(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_get() {
        let (db, client_id) = setup_db();
        let plan = make_plan(&client_id);
        db.insert_care_plan(&plan).unwrap();

        let retrieved = db.get_care_plan(&plan.id).unwrap().unwrap();
        assert_eq!(retrieved.plan_type, "Nutrition & Hydration");
        assert_eq!(retrieved.status, PlanStatus::Pending);
        assert!(retrieved.review_date.is_none());
    }

    #[test]
    fn test_decision_round_trip() {
        let (db, client_id) = setup_db();
        let mut plan = make_plan(&client_id);
        db.insert_care_plan(&plan).unwrap();

        plan.apply_decision(PlanDecision::Accepted {
            signature: "E. Moore".into(),
        });
        db.update_care_plan(&plan).unwrap();

        let retrieved = db.get_care_plan(&plan.id).unwrap().unwrap();
        assert_eq!(retrieved.status, PlanStatus::Accepted);
        assert_eq!(retrieved.signature.as_deref(), Some("E. Moore"));
    }

    #[test]
    fn test_list_for_clients() {
        let (db, client_id) = setup_db();
        db.insert_care_plan(&make_plan(&client_id)).unwrap();

        assert_eq!(
            db.list_care_plans_for_clients(&[client_id.clone()])
                .unwrap()
                .len(),
            1
        );
        assert!(db
            .list_care_plans_for_clients(&["other".to_string()])
            .unwrap()
            .is_empty());
        assert!(db.list_care_plans_for_clients(&[]).unwrap().is_empty());
    }
}
