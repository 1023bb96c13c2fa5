//! Audit trail reads and the governed purge.

use crate::models::{AuditEntry, CallerIdentity};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// List audit entries, optionally filtered by target type ("Medication",
    /// "CarePlan", ...). Client/Family callers see only entries related to
    /// their attached clients.
    pub fn list_audit_entries(
        &self,
        caller: &CallerIdentity,
        target_type: Option<&str>,
    ) -> CoreResult<Vec<AuditEntry>> {
        authorize(caller.role, Action::Read, ResourceKind::AuditLog)?;

        match scope_for(caller, ResourceKind::AuditLog)? {
            RecordScope::All => Ok(self.db().list_audit_entries(target_type)?),
            RecordScope::Clients(ids) => {
                Ok(self.db().list_audit_entries_for_clients(&ids, target_type)?)
            }
            RecordScope::StaffSelf(_) => Ok(Vec::new()),
        }
    }

    /// Delete an audit entry (Admin only). The deletion is itself recorded
    /// as a fresh entry describing what was removed.
    pub fn delete_audit_entry(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::AuditLog)?;

        let existing = self
            .db()
            .get_audit_entry(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Audit entry {}", id)))?;

        self.db().delete_audit_entry(id)?;

        let mut entry = AuditEntry::new(
            caller.email.clone(),
            "Deleted audit log entry".into(),
            ResourceKind::AuditLog.as_str().into(),
            id.to_string(),
        )
        .with_detail(existing.action);
        if let Some(client_id) = existing.client_id {
            entry = entry.with_client(client_id);
        }
        self.record_audit(entry);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn seed_entry(service: &CareService, target_type: &str, client: Option<&str>) -> AuditEntry {
        let mut entry = AuditEntry::new(
            "staff@example.com".into(),
            format!("Created {}", target_type.to_lowercase()),
            target_type.into(),
            "t1".into(),
        );
        if let Some(client_id) = client {
            entry = entry.with_client(client_id);
        }
        service.db().insert_audit_entry(&entry).unwrap();
        entry
    }

    #[test]
    fn test_filter_by_target_type() {
        let service = CareService::open_in_memory().unwrap();
        seed_entry(&service, "Medication", Some("c1"));
        seed_entry(&service, "CarePlan", Some("c1"));

        let all = service.list_audit_entries(&admin(), None).unwrap();
        assert_eq!(all.len(), 2);

        let medications = service
            .list_audit_entries(&external(), Some("Medication"))
            .unwrap();
        assert_eq!(medications.len(), 1);
        assert_eq!(medications[0].target_type, "Medication");
    }

    #[test]
    fn test_client_scoped_view() {
        let service = CareService::open_in_memory().unwrap();
        seed_entry(&service, "Medication", Some("c1"));
        seed_entry(&service, "Medication", Some("c2"));

        let visible = service
            .list_audit_entries(&family_caller(&["c1"]), None)
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].client_id.as_deref(), Some("c1"));

        let none = service
            .list_audit_entries(&family_caller(&[]), None)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_delete_is_audited() {
        let service = CareService::open_in_memory().unwrap();
        let entry = seed_entry(&service, "Medication", Some("c1"));

        // Not an admin: rejected
        assert!(matches!(
            service.delete_audit_entry(&staff(), &entry.id),
            Err(CoreError::Forbidden(_))
        ));

        service.delete_audit_entry(&admin(), &entry.id).unwrap();

        let remaining = service.list_audit_entries(&admin(), None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].action, "Deleted audit log entry");
        assert_eq!(remaining[0].target_type, "AuditLog");
        assert_eq!(remaining[0].target_id, entry.id);
        assert_eq!(remaining[0].detail.as_deref(), Some("Created medication"));
    }

    #[test]
    fn test_delete_missing_entry() {
        let service = CareService::open_in_memory().unwrap();
        let result = service.delete_audit_entry(&admin(), "no-such-entry");
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }
}
