//! User account database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Role, UserAccount};

const USER_COLUMNS: &str =
    "id, full_name, email, role, password_hash, attached_clients, staff_ref, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        password_hash: row.get(4)?,
        attached_clients: row.get(5)?,
        staff_ref: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Database {
    /// Insert a new user account.
    pub fn insert_user(&self, user: &UserAccount) -> DbResult<()> {
        let clients_json = serde_json::to_string(&user.attached_clients)?;

        self.conn.execute(
            r#"
            INSERT INTO users (
                id, full_name, email, role, password_hash, attached_clients,
                staff_ref, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user.id,
                user.full_name,
                user.email,
                user.role.as_str(),
                user.password_hash,
                clients_json,
                user.staff_ref,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing user account.
    pub fn update_user(&self, user: &UserAccount) -> DbResult<bool> {
        let clients_json = serde_json::to_string(&user.attached_clients)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE users SET
                full_name = ?2,
                email = ?3,
                role = ?4,
                password_hash = ?5,
                attached_clients = ?6,
                staff_ref = ?7
            WHERE id = ?1
            "#,
            params![
                user.id,
                user.full_name,
                user.email,
                user.role.as_str(),
                user.password_hash,
                clients_json,
                user.staff_ref,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> DbResult<Option<UserAccount>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id],
                user_from_row,
            )
            .optional()?
            .map(UserAccount::try_from)
            .transpose()
    }

    /// Get a user by email (the login key).
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<UserAccount>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                [email],
                user_from_row,
            )
            .optional()?
            .map(UserAccount::try_from)
            .transpose()
    }

    /// List all user accounts.
    pub fn list_users(&self) -> DbResult<Vec<UserAccount>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))?;
        let rows = stmt.query_map([], user_from_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?.try_into()?);
        }
        Ok(users)
    }

    /// Number of accounts holding a given role. The bootstrap rule hangs on
    /// the Admin count.
    pub fn count_users_with_role(&self, role: Role) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?",
            [role.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a user account.
    pub fn delete_user(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM users WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    role: String,
    password_hash: String,
    attached_clients: String,
    staff_ref: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let attached_clients: Vec<String> = serde_json::from_str(&row.attached_clients)?;
        let role = Role::parse(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown role: {}", row.role)))?;

        Ok(UserAccount {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            attached_clients,
            staff_ref: row.staff_ref,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(email: &str, role: Role) -> UserAccount {
        UserAccount::new("Pat Reed".into(), email.into(), role, "hash".into())
    }

    #[test]
    fn test_insert_and_get_by_email() {
        let db = Database::open_in_memory().unwrap();
        let mut user = make_user("fam@example.com", Role::Family);
        user.attached_clients = vec!["c1".into(), "c2".into()];
        db.insert_user(&user).unwrap();

        let retrieved = db.get_user_by_email("fam@example.com").unwrap().unwrap();
        assert_eq!(retrieved.role, Role::Family);
        assert_eq!(retrieved.attached_clients.len(), 2);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&make_user("pat@example.com", Role::Staff))
            .unwrap();
        assert!(db
            .insert_user(&make_user("pat@example.com", Role::Admin))
            .is_err());
    }

    #[test]
    fn test_count_admins() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_users_with_role(Role::Admin).unwrap(), 0);

        db.insert_user(&make_user("admin@example.com", Role::Admin))
            .unwrap();
        db.insert_user(&make_user("staff@example.com", Role::Staff))
            .unwrap();

        assert_eq!(db.count_users_with_role(Role::Admin).unwrap(), 1);
        assert_eq!(db.count_users_with_role(Role::Staff).unwrap(), 1);
    }
}
