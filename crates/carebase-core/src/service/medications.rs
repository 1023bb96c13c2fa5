//! Medication operations and the stock ledger.

use crate::models::{
    history_csv, Administration, AuditEntry, CallerIdentity, DoseRecord, LowStockReport,
    Medication,
};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Create a medication for an existing client.
    pub fn create_medication(
        &self,
        caller: &CallerIdentity,
        medication: &Medication,
    ) -> CoreResult<Medication> {
        authorize(caller.role, Action::Create, ResourceKind::Medication)?;

        if self.db().get_client(&medication.client_id)?.is_none() {
            return Err(CoreError::NotFound(format!(
                "Client {}",
                medication.client_id
            )));
        }

        self.db().insert_medication(medication)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Created medication".into(),
                ResourceKind::Medication.as_str().into(),
                medication.id.clone(),
            )
            .with_client(medication.client_id.clone())
            .with_detail(medication.medication_name.clone()),
        );

        Ok(medication.clone())
    }

    /// List medications visible to the caller.
    pub fn list_medications(&self, caller: &CallerIdentity) -> CoreResult<Vec<Medication>> {
        authorize(caller.role, Action::Read, ResourceKind::Medication)?;

        match scope_for(caller, ResourceKind::Medication)? {
            RecordScope::All => Ok(self.db().list_medications()?),
            RecordScope::Clients(ids) => Ok(self.db().list_medications_for_clients(&ids)?),
            RecordScope::StaffSelf(_) => Ok(Vec::new()),
        }
    }

    /// Medications for one client; scoped roles may only name their own.
    pub fn list_medications_for_client(
        &self,
        caller: &CallerIdentity,
        client_id: &str,
    ) -> CoreResult<Vec<Medication>> {
        authorize(caller.role, Action::Read, ResourceKind::Medication)?;

        let scope = scope_for(caller, ResourceKind::Medication)?;
        if !scope.permits_client(client_id) {
            return Err(CoreError::Forbidden(
                "Client is outside the caller's scope".into(),
            ));
        }

        Ok(self.db().list_medications_for_client(client_id)?)
    }

    /// Get one medication.
    pub fn get_medication(&self, caller: &CallerIdentity, id: &str) -> CoreResult<Medication> {
        authorize(caller.role, Action::Read, ResourceKind::Medication)?;

        let medication = self
            .db()
            .get_medication(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Medication {}", id)))?;

        let scope = scope_for(caller, ResourceKind::Medication)?;
        if !scope.permits_client(&medication.client_id) {
            return Err(CoreError::Forbidden(
                "Medication is outside the caller's scope".into(),
            ));
        }

        Ok(medication)
    }

    /// Update a medication's descriptive fields, schedule and stock levels.
    pub fn update_medication(
        &self,
        caller: &CallerIdentity,
        medication: &Medication,
    ) -> CoreResult<Medication> {
        authorize(caller.role, Action::Update, ResourceKind::Medication)?;

        if self.db().get_medication(&medication.id)?.is_none() {
            return Err(CoreError::NotFound(format!("Medication {}", medication.id)));
        }

        self.db().update_medication(medication)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated medication".into(),
                ResourceKind::Medication.as_str().into(),
                medication.id.clone(),
            )
            .with_client(medication.client_id.clone())
            .with_detail(medication.medication_name.clone()),
        );

        Ok(medication.clone())
    }

    /// Delete a medication and its administration history (Admin only).
    pub fn delete_medication(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::Medication)?;

        let existing = self
            .db()
            .get_medication(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Medication {}", id)))?;

        self.db().delete_medication(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted medication".into(),
                ResourceKind::Medication.as_str().into(),
                id.to_string(),
            )
            .with_client(existing.client_id)
            .with_detail(existing.medication_name),
        );

        Ok(())
    }

    /// Medications below their threshold, with the summary counts.
    pub fn low_stock_report(&self, caller: &CallerIdentity) -> CoreResult<LowStockReport> {
        authorize(caller.role, Action::Read, ResourceKind::Medication)?;

        let items = self.db().list_low_stock_medications()?;
        let scope = scope_for(caller, ResourceKind::Medication)?;
        let visible = items
            .into_iter()
            .filter(|medication| scope.permits_client(&medication.client_id))
            .collect();

        Ok(LowStockReport::from_items(visible))
    }

    /// Record an administration event: append to history and, for a given
    /// dose, take one unit of stock (floored at zero) and mark Completed.
    pub fn administer_medication(
        &mut self,
        caller: &CallerIdentity,
        medication_id: &str,
        dose: DoseRecord,
    ) -> CoreResult<Medication> {
        authorize(
            caller.role,
            Action::Create,
            ResourceKind::MedicationAdministration,
        )?;

        let medication = self
            .db()
            .get_medication(medication_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Medication {}", medication_id)))?;

        let given = dose.given;
        let administration =
            Administration::new(medication_id.to_string(), medication.client_id.clone(), dose);
        self.db_mut().record_administration(&administration)?;

        let action = if given {
            "Administered medication (stock -1)"
        } else {
            "Recorded pending administration"
        };
        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                action.into(),
                ResourceKind::Medication.as_str().into(),
                medication_id.to_string(),
            )
            .with_client(medication.client_id.clone())
            .with_detail(medication.medication_name.clone()),
        );

        self.db()
            .get_medication(medication_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Medication {}", medication_id)))
    }

    /// List administration records visible to the caller.
    pub fn list_administrations(&self, caller: &CallerIdentity) -> CoreResult<Vec<Administration>> {
        authorize(
            caller.role,
            Action::Read,
            ResourceKind::MedicationAdministration,
        )?;

        match scope_for(caller, ResourceKind::MedicationAdministration)? {
            RecordScope::All => Ok(self.db().list_administrations()?),
            RecordScope::Clients(ids) => Ok(self.db().list_administrations_for_clients(&ids)?),
            RecordScope::StaffSelf(_) => Ok(Vec::new()),
        }
    }

    /// Amend a recorded administration. A given-flag flip moves exactly one
    /// unit of stock: true→false restores it, false→true consumes it.
    pub fn amend_administration(
        &mut self,
        caller: &CallerIdentity,
        administration_id: &str,
        dose: DoseRecord,
    ) -> CoreResult<Administration> {
        authorize(
            caller.role,
            Action::Update,
            ResourceKind::MedicationAdministration,
        )?;

        let amended = self.db_mut().amend_administration(administration_id, &dose)?;

        let medication = self.db().get_medication(&amended.medication_id)?;
        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Amended medication administration record".into(),
                ResourceKind::MedicationAdministration.as_str().into(),
                administration_id.to_string(),
            )
            .with_client(amended.client_id.clone())
            .with_detail(
                medication
                    .map(|m| m.medication_name)
                    .unwrap_or_else(|| "Unknown".into()),
            ),
        );

        Ok(amended)
    }

    /// Delete an administration record, restoring one unit of stock if the
    /// removed event had been given (Admin only).
    pub fn reverse_administration(
        &mut self,
        caller: &CallerIdentity,
        administration_id: &str,
    ) -> CoreResult<Administration> {
        authorize(
            caller.role,
            Action::Delete,
            ResourceKind::MedicationAdministration,
        )?;

        let removed = self.db_mut().delete_administration(administration_id)?;

        let medication = self.db().get_medication(&removed.medication_id)?;
        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted medication administration record".into(),
                ResourceKind::MedicationAdministration.as_str().into(),
                administration_id.to_string(),
            )
            .with_client(removed.client_id.clone())
            .with_detail(
                medication
                    .map(|m| m.medication_name)
                    .unwrap_or_else(|| "Unknown".into()),
            ),
        );

        Ok(removed)
    }

    /// Administration history for one medication as CSV. The export is a
    /// governed read and leaves an audit entry.
    pub fn export_history_csv(
        &self,
        caller: &CallerIdentity,
        medication_id: &str,
    ) -> CoreResult<String> {
        let medication = self.get_medication(caller, medication_id)?;
        let history = self
            .db()
            .list_administrations_for_medication(medication_id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Exported medication history".into(),
                ResourceKind::Medication.as_str().into(),
                medication_id.to_string(),
            )
            .with_client(medication.client_id.clone())
            .with_detail(medication.medication_name.clone()),
        );

        Ok(history_csv(&history))
    }
}
