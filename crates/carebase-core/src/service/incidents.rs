//! Incident operations.

use chrono::{Months, Utc};

use crate::models::{AuditEntry, CallerIdentity, Incident, IncidentReport};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Report an incident for an existing client.
    pub fn create_incident(&self, caller: &CallerIdentity, incident: &Incident) -> CoreResult<Incident> {
        authorize(caller.role, Action::Create, ResourceKind::Incident)?;

        if self.db().get_client(&incident.client_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Client {}", incident.client_id)));
        }

        self.db().insert_incident(incident)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Created incident".into(),
                ResourceKind::Incident.as_str().into(),
                incident.id.clone(),
            )
            .with_client(incident.client_id.clone())
            .with_detail(incident.incident_type.clone()),
        );

        Ok(incident.clone())
    }

    /// Incident listing plus open/recent summary, scoped to the caller.
    /// "Recent" covers the last six months.
    pub fn incident_report(&self, caller: &CallerIdentity) -> CoreResult<IncidentReport> {
        authorize(caller.role, Action::Read, ResourceKind::Incident)?;

        let incidents = match scope_for(caller, ResourceKind::Incident)? {
            RecordScope::All => self.db().list_incidents()?,
            RecordScope::Clients(ids) => self.db().list_incidents_for_clients(&ids)?,
            RecordScope::StaffSelf(_) => Vec::new(),
        };

        let cutoff = Utc::now()
            .checked_sub_months(Months::new(6))
            .unwrap_or_else(Utc::now)
            .to_rfc3339();

        Ok(IncidentReport::from_incidents(incidents, &cutoff))
    }

    /// Get one incident.
    pub fn get_incident(&self, caller: &CallerIdentity, id: &str) -> CoreResult<Incident> {
        authorize(caller.role, Action::Read, ResourceKind::Incident)?;

        let incident = self
            .db()
            .get_incident(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Incident {}", id)))?;

        let scope = scope_for(caller, ResourceKind::Incident)?;
        if !scope.permits_client(&incident.client_id) {
            return Err(CoreError::Forbidden(
                "Incident is outside the caller's scope".into(),
            ));
        }

        Ok(incident)
    }

    /// Update an incident.
    pub fn update_incident(&self, caller: &CallerIdentity, incident: &Incident) -> CoreResult<Incident> {
        authorize(caller.role, Action::Update, ResourceKind::Incident)?;

        if self.db().get_incident(&incident.id)?.is_none() {
            return Err(CoreError::NotFound(format!("Incident {}", incident.id)));
        }

        self.db().update_incident(incident)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated incident".into(),
                ResourceKind::Incident.as_str().into(),
                incident.id.clone(),
            )
            .with_client(incident.client_id.clone())
            .with_detail(incident.incident_type.clone()),
        );

        Ok(incident.clone())
    }

    /// Delete an incident (Admin only).
    pub fn delete_incident(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::Incident)?;

        let existing = self
            .db()
            .get_incident(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Incident {}", id)))?;

        self.db().delete_incident(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted incident".into(),
                ResourceKind::Incident.as_str().into(),
                id.to_string(),
            )
            .with_client(existing.client_id)
            .with_detail(existing.incident_type),
        );

        Ok(())
    }
}
