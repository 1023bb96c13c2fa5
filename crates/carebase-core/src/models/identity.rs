//! Caller identity and roles.

use serde::{Deserialize, Serialize};

/// Role of an authenticated caller.
///
/// There is no inheritance between roles: the policy table lists every
/// permitted role explicitly, Admin included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Staff,
    Client,
    Family,
    External,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Staff => "Staff",
            Role::Client => "Client",
            Role::Family => "Family",
            Role::External => "External",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Role::Admin),
            "Staff" => Some(Role::Staff),
            "Client" => Some(Role::Client),
            "Family" => Some(Role::Family),
            "External" => Some(Role::External),
            _ => None,
        }
    }

    /// All roles, in policy-table order.
    pub fn all() -> [Role; 5] {
        [
            Role::Admin,
            Role::Staff,
            Role::Client,
            Role::Family,
            Role::External,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor for the current request.
///
/// Derived once per request from a verified credential by the session layer;
/// never persisted by this core. `attached_clients` scopes Client/Family
/// callers, `staff_ref` links a Staff caller to their own HR profile.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub attached_clients: Vec<String>,
    pub staff_ref: Option<String>,
}

impl CallerIdentity {
    /// Identity with no client or staff attachments.
    pub fn new(user_id: String, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
            attached_clients: Vec::new(),
            staff_ref: None,
        }
    }

    /// Attach the client ids this caller may see.
    pub fn with_clients(mut self, clients: Vec<String>) -> Self {
        self.attached_clients = clients;
        self
    }

    /// Attach the caller's own HR profile id.
    pub fn with_staff_ref(mut self, staff_id: String) -> Self {
        self.staff_ref = Some(staff_id);
        self
    }

    /// Whether the given client id is within this caller's attached set.
    pub fn owns_client(&self, client_id: &str) -> bool {
        self.attached_clients.iter().any(|c| c == client_id)
    }
}
