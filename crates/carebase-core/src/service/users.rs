//! User account management and the first-admin bootstrap.

use serde::{Deserialize, Serialize};

use crate::models::{CallerIdentity, Role, UserAccount, UserSummary};
use crate::policy::{authorize, Action, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

/// Signup input. The password arrives already hashed; hashing and
/// verification live in the credential layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub attached_clients: Vec<String>,
    pub staff_ref: Option<String>,
}

impl CareService {
    /// Register a user account.
    ///
    /// Bootstrap rule: while no Admin account exists, the very first signup
    /// must self-declare Admin and needs no credential. Once an Admin
    /// exists, every signup requires an authenticated Admin caller.
    pub fn register_user(
        &self,
        caller: Option<&CallerIdentity>,
        new_user: NewUser,
    ) -> CoreResult<UserSummary> {
        if new_user.full_name.trim().is_empty() || new_user.email.trim().is_empty() {
            return Err(CoreError::Validation("All fields are required".into()));
        }

        let admin_count = self.db().count_users_with_role(Role::Admin)?;
        if admin_count == 0 {
            if new_user.role != Role::Admin {
                return Err(CoreError::Validation("First user must be an Admin".into()));
            }
        } else {
            let caller = caller.ok_or_else(|| {
                CoreError::Unauthenticated("Authorization token required".into())
            })?;
            authorize(caller.role, Action::Create, ResourceKind::UserAccount)?;
        }

        if self.db().get_user_by_email(&new_user.email)?.is_some() {
            return Err(CoreError::Validation("Email already registered".into()));
        }

        let mut account = UserAccount::new(
            new_user.full_name,
            new_user.email,
            new_user.role,
            new_user.password_hash,
        );
        account.attached_clients = new_user.attached_clients;
        account.staff_ref = new_user.staff_ref;

        self.db().insert_user(&account)?;
        Ok(account.into())
    }

    /// List all accounts (Admin only). Password hashes are not returned.
    pub fn list_users(&self, caller: &CallerIdentity) -> CoreResult<Vec<UserSummary>> {
        authorize(caller.role, Action::Read, ResourceKind::UserAccount)?;
        let users = self.db().list_users()?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Get one account (Admin only).
    pub fn get_user(&self, caller: &CallerIdentity, id: &str) -> CoreResult<UserSummary> {
        authorize(caller.role, Action::Read, ResourceKind::UserAccount)?;
        let user = self
            .db()
            .get_user(id)?
            .ok_or_else(|| CoreError::NotFound(format!("User {}", id)))?;
        Ok(user.into())
    }

    /// Update an account (Admin only). Pass the full account; an unchanged
    /// password hash keeps the existing credential.
    pub fn update_user(&self, caller: &CallerIdentity, user: &UserAccount) -> CoreResult<UserSummary> {
        authorize(caller.role, Action::Update, ResourceKind::UserAccount)?;

        if user.full_name.trim().is_empty() || user.email.trim().is_empty() {
            return Err(CoreError::Validation(
                "Full name, email, and role are required".into(),
            ));
        }

        if self.db().get_user(&user.id)?.is_none() {
            return Err(CoreError::NotFound(format!("User {}", user.id)));
        }

        self.db().update_user(user)?;
        Ok(user.clone().into())
    }

    /// Delete an account (Admin only).
    pub fn delete_user(&self, caller: &CallerIdentity, id: &str) -> CoreResult<UserSummary> {
        authorize(caller.role, Action::Delete, ResourceKind::UserAccount)?;

        let existing = self
            .db()
            .get_user(id)?
            .ok_or_else(|| CoreError::NotFound(format!("User {}", id)))?;

        self.db().delete_user(id)?;
        Ok(existing.into())
    }
}
