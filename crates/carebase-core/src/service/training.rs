//! Training record operations and the expiry refresh.

use chrono::Utc;

use crate::models::{AuditEntry, CallerIdentity, TrainingRecord, TrainingStatus};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Create a training record for an existing staff member. The stored
    /// status is derived from the expiry date; whatever the caller set on
    /// the record does not survive.
    pub fn create_training_record(
        &self,
        caller: &CallerIdentity,
        record: &TrainingRecord,
    ) -> CoreResult<TrainingRecord> {
        authorize(caller.role, Action::Create, ResourceKind::Training)?;

        if self.db().get_staff_profile(&record.staff_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Staff {}", record.staff_id)));
        }

        let mut derived = record.clone();
        derived.refresh_status(Utc::now().date_naive());
        self.db().insert_training_record(&derived)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Created training record".into(),
                ResourceKind::Training.as_str().into(),
                derived.id.clone(),
            )
            .with_detail(derived.training_type.clone()),
        );

        Ok(derived)
    }

    /// List training records; Staff see only their own.
    pub fn list_training_records(
        &self,
        caller: &CallerIdentity,
    ) -> CoreResult<Vec<TrainingRecord>> {
        authorize(caller.role, Action::Read, ResourceKind::Training)?;

        match scope_for(caller, ResourceKind::Training)? {
            RecordScope::All => Ok(self.db().list_training_records()?),
            RecordScope::StaffSelf(staff_id) => {
                Ok(self.db().list_training_records_for_staff(&staff_id)?)
            }
            RecordScope::Clients(_) => Ok(Vec::new()),
        }
    }

    /// Get one training record.
    pub fn get_training_record(
        &self,
        caller: &CallerIdentity,
        id: &str,
    ) -> CoreResult<TrainingRecord> {
        authorize(caller.role, Action::Read, ResourceKind::Training)?;

        let record = self
            .db()
            .get_training_record(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Training record {}", id)))?;

        let scope = scope_for(caller, ResourceKind::Training)?;
        if !scope.permits_staff(&record.staff_id) {
            return Err(CoreError::Forbidden(
                "Training record is outside the caller's scope".into(),
            ));
        }

        Ok(record)
    }

    /// Update a training record; the status is re-derived from the (possibly
    /// changed) expiry date.
    pub fn update_training_record(
        &self,
        caller: &CallerIdentity,
        record: &TrainingRecord,
    ) -> CoreResult<TrainingRecord> {
        authorize(caller.role, Action::Update, ResourceKind::Training)?;

        if self.db().get_training_record(&record.id)?.is_none() {
            return Err(CoreError::NotFound(format!("Training record {}", record.id)));
        }

        let mut derived = record.clone();
        derived.refresh_status(Utc::now().date_naive());
        self.db().update_training_record(&derived)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated training record".into(),
                ResourceKind::Training.as_str().into(),
                derived.id.clone(),
            )
            .with_detail(derived.training_type.clone()),
        );

        Ok(derived)
    }

    /// Delete a training record (Admin only).
    pub fn delete_training_record(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::Training)?;

        let existing = self
            .db()
            .get_training_record(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Training record {}", id)))?;

        self.db().delete_training_record(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted training record".into(),
                ResourceKind::Training.as_str().into(),
                id.to_string(),
            )
            .with_detail(existing.training_type),
        );

        Ok(())
    }

    /// Recompute and persist the expiry status of every training record.
    /// Only actual changes are written, so a repeat run with the same clock
    /// does nothing. Returns how many records changed.
    pub fn refresh_training_statuses(&self, caller: &CallerIdentity) -> CoreResult<usize> {
        authorize(caller.role, Action::Update, ResourceKind::Training)?;

        let today = Utc::now().date_naive();
        let mut changed = 0;
        for record in self.db().list_training_records()? {
            let derived = TrainingStatus::derive(record.expiry_date, today);
            if derived != record.status {
                self.db().set_training_status(&record.id, derived)?;
                changed += 1;
            }
        }

        Ok(changed)
    }
}
