//! Role-based access policy.
//!
//! Every governed operation is checked against one declarative allow-list:
//! (action, resource kind) maps to the exact set of permitted roles. There
//! is no implicit inheritance and no role trusted by default; Admin appears
//! explicitly wherever it is allowed. Denial is a hard stop.

mod visibility;

pub use visibility::*;

use thiserror::Error;

use crate::models::Role;

/// Policy evaluation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{role} may not {action} {resource}")]
    Forbidden {
        role: Role,
        action: Action,
        resource: ResourceKind,
    },

    #[error("staff caller has no HR reference")]
    MissingStaffRef,
}

pub type PolicyResult<T> = Result<T, PolicyError>;

/// Operation classes governed by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Every governed resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Client,
    Medication,
    MedicationAdministration,
    CarePlan,
    Incident,
    Training,
    Compliance,
    StaffDocument,
    StaffProfile,
    Performance,
    SocialActivity,
    Template,
    ConsentRecord,
    DailyLog,
    Goal,
    Handover,
    RiskAssessment,
    PbsPlan,
    UserAccount,
    AuditLog,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Client => "Client",
            ResourceKind::Medication => "Medication",
            ResourceKind::MedicationAdministration => "MedicationAdministration",
            ResourceKind::CarePlan => "CarePlan",
            ResourceKind::Incident => "Incident",
            ResourceKind::Training => "Training",
            ResourceKind::Compliance => "Compliance",
            ResourceKind::StaffDocument => "StaffDocument",
            ResourceKind::StaffProfile => "StaffProfile",
            ResourceKind::Performance => "Performance",
            ResourceKind::SocialActivity => "SocialActivity",
            ResourceKind::Template => "Template",
            ResourceKind::ConsentRecord => "ConsentRecord",
            ResourceKind::DailyLog => "DailyLog",
            ResourceKind::Goal => "Goal",
            ResourceKind::Handover => "Handover",
            ResourceKind::RiskAssessment => "RiskAssessment",
            ResourceKind::PbsPlan => "PbsPlan",
            ResourceKind::UserAccount => "UserAccount",
            ResourceKind::AuditLog => "AuditLog",
        }
    }

    /// All governed kinds, for policy sweeps.
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Client,
            ResourceKind::Medication,
            ResourceKind::MedicationAdministration,
            ResourceKind::CarePlan,
            ResourceKind::Incident,
            ResourceKind::Training,
            ResourceKind::Compliance,
            ResourceKind::StaffDocument,
            ResourceKind::StaffProfile,
            ResourceKind::Performance,
            ResourceKind::SocialActivity,
            ResourceKind::Template,
            ResourceKind::ConsentRecord,
            ResourceKind::DailyLog,
            ResourceKind::Goal,
            ResourceKind::Handover,
            ResourceKind::RiskAssessment,
            ResourceKind::PbsPlan,
            ResourceKind::UserAccount,
            ResourceKind::AuditLog,
        ]
    }

    /// Resources owned by a client record (scoped for Client/Family roles).
    pub fn is_client_owned(&self) -> bool {
        matches!(
            self,
            ResourceKind::Client
                | ResourceKind::Medication
                | ResourceKind::MedicationAdministration
                | ResourceKind::CarePlan
                | ResourceKind::Incident
                | ResourceKind::Compliance
                | ResourceKind::SocialActivity
                | ResourceKind::ConsentRecord
                | ResourceKind::DailyLog
                | ResourceKind::Goal
                | ResourceKind::Handover
                | ResourceKind::RiskAssessment
                | ResourceKind::PbsPlan
                | ResourceKind::AuditLog
        )
    }

    /// Resources owned by a staff record (scoped to self for Staff role).
    pub fn is_staff_owned(&self) -> bool {
        matches!(
            self,
            ResourceKind::StaffProfile
                | ResourceKind::Training
                | ResourceKind::Performance
                | ResourceKind::StaffDocument
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_STAFF: &[Role] = &[Role::Admin, Role::Staff];
const ADMIN_STAFF_CLIENT: &[Role] = &[Role::Admin, Role::Staff, Role::Client];
const ADMIN_STAFF_EXTERNAL: &[Role] = &[Role::Admin, Role::Staff, Role::External];
const ADMIN_STAFF_CLIENT_FAMILY: &[Role] = &[Role::Admin, Role::Staff, Role::Client, Role::Family];
const EVERYONE: &[Role] = &[
    Role::Admin,
    Role::Staff,
    Role::Client,
    Role::Family,
    Role::External,
];
const NOBODY: &[Role] = &[];

/// The allow-list: exact roles permitted for each (action, resource) pair.
pub fn allowed_roles(action: Action, resource: ResourceKind) -> &'static [Role] {
    use ResourceKind::*;

    // Deletion is Admin-only across the board.
    if action == Action::Delete {
        return ADMIN_ONLY;
    }

    match (action, resource) {
        // Client-facing operational records: broad read, Admin/Staff write
        (Action::Read, Client) => EVERYONE,
        (Action::Read, Medication) => EVERYONE,
        (Action::Read, SocialActivity) => EVERYONE,
        (Action::Read, ConsentRecord) => EVERYONE,
        (Action::Read, DailyLog) => EVERYONE,
        (Action::Read, Goal) => EVERYONE,
        (Action::Read, Handover) => EVERYONE,
        (Action::Read, RiskAssessment) => EVERYONE,
        (Action::Read, PbsPlan) => EVERYONE,
        (Action::Read, CarePlan) => ADMIN_STAFF_CLIENT_FAMILY,
        (Action::Read, MedicationAdministration) => ADMIN_STAFF_CLIENT,
        (Action::Read, Incident) => ADMIN_STAFF_CLIENT,
        (Action::Read, Compliance) => ADMIN_STAFF_CLIENT,
        (Action::Read, Training) => ADMIN_STAFF,
        (Action::Read, StaffDocument) => ADMIN_STAFF,
        (Action::Read, Template) => ADMIN_STAFF,
        (Action::Read, StaffProfile) => ADMIN_STAFF_EXTERNAL,
        (Action::Read, Performance) => ADMIN_STAFF_EXTERNAL,
        (Action::Read, AuditLog) => EVERYONE,
        (Action::Read, UserAccount) => ADMIN_ONLY,

        // Care plans admit the client acknowledgment transition
        (Action::Update, CarePlan) => ADMIN_STAFF_CLIENT,

        // HR records and accounts are managed by admins alone
        (Action::Create, StaffProfile) | (Action::Update, StaffProfile) => ADMIN_ONLY,
        (Action::Create, UserAccount) | (Action::Update, UserAccount) => ADMIN_ONLY,

        // The trail itself is written internally and never edited
        (Action::Create, AuditLog) | (Action::Update, AuditLog) => NOBODY,

        // Everything else: Admin and Staff
        (Action::Create, _) | (Action::Update, _) => ADMIN_STAFF,

        (Action::Delete, _) => unreachable!("handled above"),
    }
}

/// Decide whether `role` may perform `action` on `resource`.
pub fn authorize(role: Role, action: Action, resource: ResourceKind) -> PolicyResult<()> {
    if allowed_roles(action, resource).contains(&role) {
        Ok(())
    } else {
        Err(PolicyError::Forbidden {
            role,
            action,
            resource,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role::{Admin, Client, Family};

    #[test]
    fn test_delete_is_admin_only_everywhere() {
        for &resource in ResourceKind::all() {
            for role in Role::all() {
                let decision = authorize(role, Action::Delete, resource);
                if role == Role::Admin {
                    assert!(decision.is_ok(), "Admin delete {resource}");
                } else {
                    assert!(decision.is_err(), "{role} delete {resource}");
                }
            }
        }
    }

    #[test]
    fn test_no_role_trusted_by_default() {
        // The trail is written by the core itself, not by any caller.
        for role in Role::all() {
            assert!(authorize(role, Action::Create, ResourceKind::AuditLog).is_err());
            assert!(authorize(role, Action::Update, ResourceKind::AuditLog).is_err());
        }
    }

    #[test]
    fn test_client_acknowledgment_path() {
        assert!(authorize(Client, Action::Update, ResourceKind::CarePlan).is_ok());
        assert!(authorize(Client, Action::Update, ResourceKind::Medication).is_err());
        assert!(authorize(Family, Action::Update, ResourceKind::CarePlan).is_err());
    }

    #[test]
    fn test_account_management_admin_only() {
        for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
            for role in Role::all() {
                let decision = authorize(role, action, ResourceKind::UserAccount);
                assert_eq!(decision.is_ok(), role == Admin, "{role} {action} UserAccount");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for &resource in ResourceKind::all() {
            for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
                for role in Role::all() {
                    let first = authorize(role, action, resource).is_ok();
                    let second = authorize(role, action, resource).is_ok();
                    assert_eq!(first, second);
                }
            }
        }
    }
}
