//! Care plan operations.

use crate::models::{AuditEntry, CallerIdentity, CarePlan, PlanDecision, Role};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Create a care plan for an existing client.
    pub fn create_care_plan(&self, caller: &CallerIdentity, plan: &CarePlan) -> CoreResult<CarePlan> {
        authorize(caller.role, Action::Create, ResourceKind::CarePlan)?;

        if self.db().get_client(&plan.client_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Client {}", plan.client_id)));
        }

        self.db().insert_care_plan(plan)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Created care plan".into(),
                ResourceKind::CarePlan.as_str().into(),
                plan.id.clone(),
            )
            .with_client(plan.client_id.clone())
            .with_detail(plan.plan_type.clone()),
        );

        Ok(plan.clone())
    }

    /// List care plans visible to the caller.
    pub fn list_care_plans(&self, caller: &CallerIdentity) -> CoreResult<Vec<CarePlan>> {
        authorize(caller.role, Action::Read, ResourceKind::CarePlan)?;

        match scope_for(caller, ResourceKind::CarePlan)? {
            RecordScope::All => Ok(self.db().list_care_plans()?),
            RecordScope::Clients(ids) => Ok(self.db().list_care_plans_for_clients(&ids)?),
            RecordScope::StaffSelf(_) => Ok(Vec::new()),
        }
    }

    /// Get one care plan.
    pub fn get_care_plan(&self, caller: &CallerIdentity, id: &str) -> CoreResult<CarePlan> {
        authorize(caller.role, Action::Read, ResourceKind::CarePlan)?;

        let plan = self
            .db()
            .get_care_plan(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Care plan {}", id)))?;

        let scope = scope_for(caller, ResourceKind::CarePlan)?;
        if !scope.permits_client(&plan.client_id) {
            return Err(CoreError::Forbidden(
                "Care plan is outside the caller's scope".into(),
            ));
        }

        Ok(plan)
    }

    /// Full update of a care plan. Client-role callers use
    /// [`CareService::decide_care_plan`] instead; their update access covers
    /// only the acknowledgment transition.
    pub fn update_care_plan(&self, caller: &CallerIdentity, plan: &CarePlan) -> CoreResult<CarePlan> {
        authorize(caller.role, Action::Update, ResourceKind::CarePlan)?;
        if caller.role == Role::Client {
            return Err(CoreError::Forbidden(
                "Clients may only accept or decline their care plan".into(),
            ));
        }

        if self.db().get_care_plan(&plan.id)?.is_none() {
            return Err(CoreError::NotFound(format!("Care plan {}", plan.id)));
        }

        self.db().update_care_plan(plan)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated care plan".into(),
                ResourceKind::CarePlan.as_str().into(),
                plan.id.clone(),
            )
            .with_client(plan.client_id.clone())
            .with_detail(plan.plan_type.clone()),
        );

        Ok(plan.clone())
    }

    /// Accept or decline a care plan. Client callers may only decide plans
    /// for their own attached clients.
    pub fn decide_care_plan(
        &self,
        caller: &CallerIdentity,
        plan_id: &str,
        decision: PlanDecision,
    ) -> CoreResult<CarePlan> {
        authorize(caller.role, Action::Update, ResourceKind::CarePlan)?;

        let mut plan = self
            .db()
            .get_care_plan(plan_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Care plan {}", plan_id)))?;

        if caller.role == Role::Client && !caller.owns_client(&plan.client_id) {
            return Err(CoreError::Forbidden(
                "Care plan is outside the caller's scope".into(),
            ));
        }

        plan.apply_decision(decision);
        self.db().update_care_plan(&plan)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated care plan".into(),
                ResourceKind::CarePlan.as_str().into(),
                plan.id.clone(),
            )
            .with_client(plan.client_id.clone())
            .with_detail(plan.plan_type.clone()),
        );

        Ok(plan)
    }

    /// Delete a care plan (Admin only).
    pub fn delete_care_plan(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::CarePlan)?;

        let existing = self
            .db()
            .get_care_plan(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Care plan {}", id)))?;

        self.db().delete_care_plan(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted care plan".into(),
                ResourceKind::CarePlan.as_str().into(),
                id.to_string(),
            )
            .with_client(existing.client_id)
            .with_detail(existing.plan_type),
        );

        Ok(())
    }
}
