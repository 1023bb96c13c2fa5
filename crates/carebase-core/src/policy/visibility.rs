//! Record visibility: narrowing queries to what a caller may see.
//!
//! Applied server-side on every list/read that admits scoped roles; the
//! caller never self-restricts.

use crate::models::{CallerIdentity, Role};

use super::{PolicyError, PolicyResult, ResourceKind};

/// The subset of records a caller may see for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordScope {
    /// Organization-wide: no narrowing.
    All,
    /// Records whose owning client is in this set. An empty set yields an
    /// empty result, never an error and never "all records".
    Clients(Vec<String>),
    /// The single record set owned by this staff member.
    StaffSelf(String),
}

impl RecordScope {
    /// Whether a record owned by `client_id` is visible under this scope.
    pub fn permits_client(&self, client_id: &str) -> bool {
        match self {
            RecordScope::All => true,
            RecordScope::Clients(ids) => ids.iter().any(|c| c == client_id),
            RecordScope::StaffSelf(_) => false,
        }
    }

    /// Whether a record owned by `staff_id` is visible under this scope.
    pub fn permits_staff(&self, staff_id: &str) -> bool {
        match self {
            RecordScope::All => true,
            RecordScope::Clients(_) => false,
            RecordScope::StaffSelf(own) => own == staff_id,
        }
    }
}

/// Compute the visibility scope for a caller on a resource kind.
///
/// Assumes `authorize` already passed for the read; this only narrows.
/// Staff callers are restricted to their own record on staff-owned
/// resources; a Staff caller without an HR reference is a configuration
/// error surfaced to the client, not an empty or unbounded view.
pub fn scope_for(identity: &CallerIdentity, resource: ResourceKind) -> PolicyResult<RecordScope> {
    match identity.role {
        Role::Client | Role::Family if resource.is_client_owned() => {
            Ok(RecordScope::Clients(identity.attached_clients.clone()))
        }
        Role::Staff if resource.is_staff_owned() => match &identity.staff_ref {
            Some(staff_id) => Ok(RecordScope::StaffSelf(staff_id.clone())),
            None => Err(PolicyError::MissingStaffRef),
        },
        _ => Ok(RecordScope::All),
    }
}
