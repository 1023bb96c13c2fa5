//! Audit trail entries.

use serde::{Deserialize, Serialize};

/// One immutable audit event.
///
/// Written after a governed mutation commits; never updated. Deleting an
/// entry is Admin-only and produces a new entry describing the deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    /// Email of the acting user.
    pub actor: String,
    /// Human-readable action label ("Created medication", ...)
    pub action: String,
    /// Resource kind name ("Medication", "CarePlan", ...)
    pub target_type: String,
    pub target_id: String,
    /// Owning client of the target, where one exists; scopes audit views.
    pub client_id: Option<String>,
    /// Extra context, e.g. the medication name.
    pub detail: Option<String>,
    pub timestamp: String,
}

impl AuditEntry {
    pub fn new(actor: String, action: String, target_type: String, target_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor,
            action,
            target_type,
            target_id,
            client_id: None,
            detail: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
