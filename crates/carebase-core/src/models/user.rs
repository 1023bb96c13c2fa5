//! User accounts.

use serde::{Deserialize, Serialize};

use super::identity::{CallerIdentity, Role};

/// A login account.
///
/// `password_hash` is opaque to this core: hashing and verification happen
/// in the credential layer. `attached_clients` and `staff_ref` become the
/// scoping data on the caller identity at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub attached_clients: Vec<String>,
    pub staff_ref: Option<String>,
    pub created_at: String,
}

impl UserAccount {
    pub fn new(full_name: String, email: String, role: Role, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            email,
            role,
            password_hash,
            attached_clients: Vec::new(),
            staff_ref: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The identity this account carries into a request.
    pub fn identity(&self) -> CallerIdentity {
        CallerIdentity {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            attached_clients: self.attached_clients.clone(),
            staff_ref: self.staff_ref.clone(),
        }
    }
}

/// Account data safe to return to callers (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub attached_clients: Vec<String>,
    pub staff_ref: Option<String>,
    pub created_at: String,
}

impl From<UserAccount> for UserSummary {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name,
            email: account.email,
            role: account.role,
            attached_clients: account.attached_clients,
            staff_ref: account.staff_ref,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_carries_scoping() {
        let mut account = UserAccount::new(
            "Pat Reed".into(),
            "pat@example.com".into(),
            Role::Staff,
            "hash".into(),
        );
        account.staff_ref = Some("staff-9".into());

        let identity = account.identity();
        assert_eq!(identity.role, Role::Staff);
        assert_eq!(identity.staff_ref.as_deref(), Some("staff-9"));
    }

    #[test]
    fn test_summary_drops_hash() {
        let account = UserAccount::new(
            "Pat Reed".into(),
            "pat@example.com".into(),
            Role::Admin,
            "hash".into(),
        );
        let json = serde_json::to_string(&UserSummary::from(account)).unwrap();
        assert!(!json.contains("hash"));
    }
}
