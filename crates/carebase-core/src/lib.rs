//! Carebase Core Library
//!
//! Care-home records management core: role-based access policy, record
//! visibility, the medication stock ledger, the audit trail, and training
//! expiry derivation, over an embedded SQLite store.
//!
//! # Architecture
//!
//! ```text
//! Request (CallerIdentity from verified credential)
//!     │
//!     ▼
//! ┌──────────────────────────────┐
//! │ Access Policy                │  allow-list: (action, resource) → roles
//! │   authorize(role, op, kind)  │  deny = hard stop (Forbidden)
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ Visibility Filter            │  All | Clients(attached) | StaffSelf
//! │   scope_for(identity, kind)  │
//! └──────────────┬───────────────┘
//!                ▼
//!        fetch / mutate (SQLite)
//!                │
//!        ┌───────┼────────────┐
//!        ▼       ▼            ▼
//!    Stock    Audit        Status
//!    Ledger   Trail        Deriver
//!   (atomic) (append-only) (pure)
//! ```
//!
//! # Core Principle
//!
//! **No role is trusted by default.** Every operation on every resource is
//! an explicit allow-list entry, and scoped callers are narrowed server-side
//! on every read.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Client, Medication, CarePlan, etc.)
//! - [`policy`]: Access policy table and visibility scoping
//! - [`service`]: Governed operations (authorize → scope → mutate → audit)

pub mod db;
pub mod models;
pub mod policy;
pub mod service;

// Re-export commonly used types
pub use db::Database;
pub use models::{
    Administration, AuditEntry, CallerIdentity, CarePlan, Client, DoseRecord, Incident,
    Medication, MedicationStatus, PlanDecision, Role, StaffProfile, TrainingRecord,
    TrainingStatus, UserAccount,
};
pub use policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
pub use service::CareService;

use policy::PolicyError;

// =========================================================================
// Core Error Type
// =========================================================================

/// Errors surfaced by the governed operations, one variant per response
/// class.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Stable machine-readable kind for response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Unauthenticated(_) => "authentication_error",
            CoreError::Forbidden(_) => "authorization_error",
            CoreError::Validation(_) => "validation_error",
            CoreError::NotFound(_) => "not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::Database(_) => "dependency_error",
        }
    }

    /// HTTP status the outer layer should respond with.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Unauthenticated(_) => 401,
            CoreError::Forbidden(_) => 403,
            CoreError::Validation(_) => 400,
            CoreError::NotFound(_) => 404,
            CoreError::Conflict(_) => 409,
            CoreError::Database(_) => 500,
        }
    }
}

impl From<db::DbError> for CoreError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => CoreError::NotFound(what),
            // Dependency failures are not leaked verbatim beyond the display
            other => CoreError::Database(other.to_string()),
        }
    }
}

impl From<PolicyError> for CoreError {
    fn from(e: PolicyError) -> Self {
        match e {
            PolicyError::Forbidden { .. } => CoreError::Forbidden(e.to_string()),
            PolicyError::MissingStaffRef => {
                CoreError::Validation("Staff caller has no HR reference".into())
            }
        }
    }
}
