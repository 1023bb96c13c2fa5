//! Staff profile operations.

use crate::models::{AuditEntry, CallerIdentity, StaffDirectory, StaffProfile};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Add a staff profile (Admin only).
    pub fn create_staff_profile(
        &self,
        caller: &CallerIdentity,
        staff: &StaffProfile,
    ) -> CoreResult<StaffProfile> {
        authorize(caller.role, Action::Create, ResourceKind::StaffProfile)?;

        self.db().insert_staff_profile(staff)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Added staff profile".into(),
                ResourceKind::StaffProfile.as_str().into(),
                staff.id.clone(),
            )
            .with_detail(staff.full_name.clone()),
        );

        Ok(staff.clone())
    }

    /// Staff directory. A Staff caller gets just their own profile; Admin
    /// and External get the whole directory.
    pub fn list_staff(&self, caller: &CallerIdentity) -> CoreResult<StaffDirectory> {
        authorize(caller.role, Action::Read, ResourceKind::StaffProfile)?;

        let staff = match scope_for(caller, ResourceKind::StaffProfile)? {
            RecordScope::All => self.db().list_staff_profiles()?,
            RecordScope::StaffSelf(staff_id) => {
                self.db().get_staff_profile(&staff_id)?.into_iter().collect()
            }
            RecordScope::Clients(_) => Vec::new(),
        };

        Ok(StaffDirectory::from_staff(staff))
    }

    /// Get one staff profile.
    pub fn get_staff_profile(&self, caller: &CallerIdentity, id: &str) -> CoreResult<StaffProfile> {
        authorize(caller.role, Action::Read, ResourceKind::StaffProfile)?;

        let staff = self
            .db()
            .get_staff_profile(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Staff {}", id)))?;

        let scope = scope_for(caller, ResourceKind::StaffProfile)?;
        if !scope.permits_staff(&staff.id) {
            return Err(CoreError::Forbidden(
                "Staff profile is outside the caller's scope".into(),
            ));
        }

        Ok(staff)
    }

    /// Update a staff profile (Admin only).
    pub fn update_staff_profile(
        &self,
        caller: &CallerIdentity,
        staff: &StaffProfile,
    ) -> CoreResult<StaffProfile> {
        authorize(caller.role, Action::Update, ResourceKind::StaffProfile)?;

        if self.db().get_staff_profile(&staff.id)?.is_none() {
            return Err(CoreError::NotFound(format!("Staff {}", staff.id)));
        }

        self.db().update_staff_profile(staff)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated staff profile".into(),
                ResourceKind::StaffProfile.as_str().into(),
                staff.id.clone(),
            )
            .with_detail(staff.full_name.clone()),
        );

        Ok(staff.clone())
    }

    /// Delete a staff profile (Admin only).
    pub fn delete_staff_profile(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::StaffProfile)?;

        let existing = self
            .db()
            .get_staff_profile(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Staff {}", id)))?;

        self.db().delete_staff_profile(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted staff profile".into(),
                ResourceKind::StaffProfile.as_str().into(),
                id.to_string(),
            )
            .with_detail(existing.full_name),
        );

        Ok(())
    }
}
