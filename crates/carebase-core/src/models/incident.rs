//! Incident reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    Open,
    UnderInvestigation,
    Resolved,
}

/// An incident involving a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: String,
    pub client_id: String,
    pub incident_date: NaiveDate,
    /// Free-form category ("Fall", "Medication Error", ...)
    pub incident_type: String,
    pub severity: IncidentSeverity,
    pub reported_by: String,
    pub details: String,
    pub status: IncidentStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Incident listing with the open/recent summary the dashboards expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentReport {
    pub incidents: Vec<Incident>,
    pub open_incidents_count: usize,
    pub recent_incidents_count: usize,
    /// Incidents recorded within the last six months.
    pub recent_incidents: Vec<Incident>,
}

impl IncidentReport {
    /// Summarize a visible incident set against an RFC 3339 cutoff.
    pub fn from_incidents(incidents: Vec<Incident>, recent_cutoff: &str) -> Self {
        let open_incidents_count = incidents
            .iter()
            .filter(|inc| inc.status == IncidentStatus::Open)
            .count();
        let recent_incidents: Vec<Incident> = incidents
            .iter()
            .filter(|inc| inc.created_at.as_str() >= recent_cutoff)
            .cloned()
            .collect();
        Self {
            open_incidents_count,
            recent_incidents_count: recent_incidents.len(),
            recent_incidents,
            incidents,
        }
    }
}

impl Incident {
    pub fn new(
        client_id: String,
        incident_date: NaiveDate,
        incident_type: String,
        severity: IncidentSeverity,
        reported_by: String,
        details: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id,
            incident_date,
            incident_type,
            severity,
            reported_by,
            details,
            status: IncidentStatus::Open,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
