//! Service facade: the governed operations.
//!
//! Every operation runs the same sequence: authorize the caller against the
//! policy table, narrow to the caller's visibility scope, perform the
//! fetch/mutation, then apply side effects (stock ledger, audit trail).

mod audit;
mod care_plans;
mod clients;
mod incidents;
mod medications;
mod staff;
mod training;
mod users;

#[allow(unused_imports)]
pub use users::*;

use std::path::Path;

use crate::db::Database;
use crate::models::AuditEntry;
use crate::CoreResult;

/// The main entry point for callers.
///
/// Holds the database handle; operations are grouped by entity in the
/// sibling modules. Wrap in `Arc<Mutex<..>>` to share across request
/// handlers: the mutex serializes operations while the SQL keeps each
/// mutation atomic on its own.
pub struct CareService {
    db: Database,
}

impl CareService {
    /// Wrap an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    /// Create an in-memory service (for testing).
    pub fn open_in_memory() -> CoreResult<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    /// Read access to the underlying database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub(crate) fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Append an audit entry after a committed mutation.
    ///
    /// Best-effort by design: a failed audit write is logged and swallowed
    /// so it never rolls back or fails the mutation it describes.
    pub(crate) fn record_audit(&self, entry: AuditEntry) {
        if let Err(err) = self.db.insert_audit_entry(&entry) {
            log::warn!(
                "audit write failed for {} {}: {}",
                entry.target_type,
                entry.target_id,
                err
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::CareService;
    use crate::models::{CallerIdentity, Client, Medication, Role, StaffProfile, Stock};

    pub fn admin() -> CallerIdentity {
        CallerIdentity::new("u-admin".into(), "admin@example.com".into(), Role::Admin)
    }

    pub fn staff_with_ref(staff_id: &str) -> CallerIdentity {
        CallerIdentity::new("u-staff".into(), "staff@example.com".into(), Role::Staff)
            .with_staff_ref(staff_id.into())
    }

    pub fn staff() -> CallerIdentity {
        CallerIdentity::new("u-staff".into(), "staff@example.com".into(), Role::Staff)
    }

    pub fn client_caller(clients: &[&str]) -> CallerIdentity {
        CallerIdentity::new("u-client".into(), "client@example.com".into(), Role::Client)
            .with_clients(clients.iter().map(|s| s.to_string()).collect())
    }

    pub fn family_caller(clients: &[&str]) -> CallerIdentity {
        CallerIdentity::new("u-family".into(), "family@example.com".into(), Role::Family)
            .with_clients(clients.iter().map(|s| s.to_string()).collect())
    }

    pub fn external() -> CallerIdentity {
        CallerIdentity::new("u-ext".into(), "auditor@example.com".into(), Role::External)
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Insert a client directly, bypassing the governed path.
    pub fn seed_client(service: &CareService, name: &str, room: &str) -> Client {
        let client = Client::new(
            name.into(),
            84,
            room.into(),
            "Residential".into(),
            day(2024, 3, 1),
        );
        service.db().insert_client(&client).unwrap();
        client
    }

    pub fn seed_staff(service: &CareService, name: &str, email: &str) -> StaffProfile {
        let staff = StaffProfile::new(
            name.into(),
            email.into(),
            "Care Assistant".into(),
            "Care".into(),
            day(2022, 1, 10),
        );
        service.db().insert_staff_profile(&staff).unwrap();
        staff
    }

    pub fn seed_medication(
        service: &CareService,
        client_id: &str,
        name: &str,
        quantity: u32,
        threshold: u32,
    ) -> Medication {
        let mut medication =
            Medication::new(client_id.to_string(), name.into(), "Sam Field".into());
        medication.stock = Stock {
            quantity,
            threshold,
        };
        service.db().insert_medication(&medication).unwrap();
        medication
    }
}
