//! Incident database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::{Incident, IncidentSeverity, IncidentStatus};

const INCIDENT_COLUMNS: &str = "id, client_id, incident_date, incident_type, severity, \
     reported_by, details, status, created_at, updated_at";

fn incident_from_row(row: &Row<'_>) -> rusqlite::Result<IncidentRow> {
    Ok(IncidentRow {
        id: row.get(0)?,
        client_id: row.get(1)?,
        incident_date: row.get(2)?,
        incident_type: row.get(3)?,
        severity: row.get(4)?,
        reported_by: row.get(5)?,
        details: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Database {
    /// Insert a new incident.
    pub fn insert_incident(&self, incident: &Incident) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO incidents (
                id, client_id, incident_date, incident_type, severity,
                reported_by, details, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                incident.id,
                incident.client_id,
                format_date(incident.incident_date),
                incident.incident_type,
                severity_to_string(&incident.severity),
                incident.reported_by,
                incident.details,
                incident_status_to_string(&incident.status),
                incident.created_at,
                incident.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing incident.
    pub fn update_incident(&self, incident: &Incident) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE incidents SET
                incident_date = ?2,
                incident_type = ?3,
                severity = ?4,
                reported_by = ?5,
                details = ?6,
                status = ?7,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                incident.id,
                format_date(incident.incident_date),
                incident.incident_type,
                severity_to_string(&incident.severity),
                incident.reported_by,
                incident.details,
                incident_status_to_string(&incident.status),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an incident by id.
    pub fn get_incident(&self, id: &str) -> DbResult<Option<Incident>> {
        self.conn
            .query_row(
                &format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = ?"),
                [id],
                incident_from_row,
            )
            .optional()?
            .map(Incident::try_from)
            .transpose()
    }

    /// List all incidents, most recent first.
    pub fn list_incidents(&self) -> DbResult<Vec<Incident>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], incident_from_row)?;

        let mut incidents = Vec::new();
        for row in rows {
            incidents.push(row?.try_into()?);
        }
        Ok(incidents)
    }

    /// List incidents whose owning client is in the given set.
    pub fn list_incidents_for_clients(&self, client_ids: &[String]) -> DbResult<Vec<Incident>> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = client_ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE client_id IN ({}) ORDER BY created_at DESC",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(client_ids.iter()),
            incident_from_row,
        )?;

        let mut incidents = Vec::new();
        for row in rows {
            incidents.push(row?.try_into()?);
        }
        Ok(incidents)
    }

    /// Delete an incident.
    pub fn delete_incident(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM incidents WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct IncidentRow {
    id: String,
    client_id: String,
    incident_date: String,
    incident_type: String,
    severity: String,
    reported_by: String,
    details: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<IncidentRow> for Incident {
    type Error = DbError;

    fn try_from(row: IncidentRow) -> Result<Self, Self::Error> {
        Ok(Incident {
            id: row.id,
            client_id: row.client_id,
            incident_date: parse_date(&row.incident_date)?,
            incident_type: row.incident_type,
            severity: string_to_severity(&row.severity)?,
            reported_by: row.reported_by,
            details: row.details,
            status: string_to_incident_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn severity_to_string(severity: &IncidentSeverity) -> &'static str {
    match severity {
        IncidentSeverity::Low => "low",
        IncidentSeverity::Medium => "medium",
        IncidentSeverity::High => "high",
        IncidentSeverity::Critical => "critical",
    }
}

fn string_to_severity(s: &str) -> Result<IncidentSeverity, DbError> {
    match s {
        "low" => Ok(IncidentSeverity::Low),
        "medium" => Ok(IncidentSeverity::Medium),
        "high" => Ok(IncidentSeverity::High),
        "critical" => Ok(IncidentSeverity::Critical),
        _ => Err(DbError::Constraint(format!("Unknown severity: {}", s))),
    }
}

fn incident_status_to_string(status: &IncidentStatus) -> &'static str {
    match status {
        IncidentStatus::Open => "open",
        IncidentStatus::UnderInvestigation => "under_investigation",
        IncidentStatus::Resolved => "resolved",
    }
}

fn string_to_incident_status(s: &str) -> Result<IncidentStatus, DbError> {
    match s {
        "open" => Ok(IncidentStatus::Open),
        "under_investigation" => Ok(IncidentStatus::UnderInvestigation),
        "resolved" => Ok(IncidentStatus::Resolved),
        _ => Err(DbError::Constraint(format!(
            "Unknown incident status: {}",
            s
        ))),
    }
}
