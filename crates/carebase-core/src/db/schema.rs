//! SQLite schema definition.

/// Complete database schema for carebase.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Clients (residents)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    age INTEGER NOT NULL,
    room_number TEXT NOT NULL UNIQUE,
    care_type TEXT NOT NULL,
    admission_date TEXT NOT NULL,                -- 'YYYY-MM-DD'
    nhs_number TEXT,
    gp_surgery TEXT,
    next_of_kin_name TEXT,
    next_of_kin_phone TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(full_name);

-- ============================================================================
-- Staff (HR profiles)
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff_profiles (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    position TEXT NOT NULL,
    department TEXT NOT NULL,
    start_date TEXT NOT NULL,
    care_setting TEXT,
    contact_number TEXT,
    address TEXT,
    dbs_status TEXT,
    right_to_work_status TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- User accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    attached_clients TEXT NOT NULL DEFAULT '[]', -- JSON array of client ids
    staff_ref TEXT REFERENCES staff_profiles(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

-- ============================================================================
-- Medications and administrations
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL REFERENCES clients(id),
    medication_name TEXT NOT NULL,
    caregiver_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',      -- pending, completed
    frequency TEXT,
    times TEXT NOT NULL DEFAULT '[]',            -- JSON array of strings
    quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    threshold INTEGER NOT NULL DEFAULT 5,
    attachments TEXT NOT NULL DEFAULT '[]',      -- JSON array of URLs
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_client ON medications(client_id);

CREATE TABLE IF NOT EXISTS administrations (
    id TEXT PRIMARY KEY,
    medication_id TEXT NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    client_id TEXT NOT NULL,
    date TEXT NOT NULL,                          -- 'YYYY-MM-DD'
    time TEXT NOT NULL,
    given INTEGER NOT NULL,
    caregiver TEXT NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_administrations_medication ON administrations(medication_id);
CREATE INDEX IF NOT EXISTS idx_administrations_client ON administrations(client_id);

-- ============================================================================
-- Care plans
-- ============================================================================

CREATE TABLE IF NOT EXISTS care_plans (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL REFERENCES clients(id),
    plan_type TEXT NOT NULL,
    creation_date TEXT NOT NULL,
    review_date TEXT,
    details TEXT,
    care_setting TEXT,
    status TEXT NOT NULL DEFAULT 'pending',      -- pending, accepted, declined
    signature TEXT,
    decline_reason TEXT,
    attachments TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_care_plans_client ON care_plans(client_id);
CREATE INDEX IF NOT EXISTS idx_care_plans_status ON care_plans(status);

-- ============================================================================
-- Training records
-- ============================================================================

CREATE TABLE IF NOT EXISTS training_records (
    id TEXT PRIMARY KEY,
    staff_id TEXT NOT NULL REFERENCES staff_profiles(id),
    training_type TEXT NOT NULL,
    completion_date TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'valid',        -- valid, expiring_soon, expired
    notes TEXT,
    attachments TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_training_staff ON training_records(staff_id);
CREATE INDEX IF NOT EXISTS idx_training_expiry ON training_records(expiry_date);

-- ============================================================================
-- Incidents
-- ============================================================================

CREATE TABLE IF NOT EXISTS incidents (
    id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL REFERENCES clients(id),
    incident_date TEXT NOT NULL,
    incident_type TEXT NOT NULL,
    severity TEXT NOT NULL,                      -- low, medium, high, critical
    reported_by TEXT NOT NULL,
    details TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',         -- open, under_investigation, resolved
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_incidents_client ON incidents(client_id);
CREATE INDEX IF NOT EXISTS idx_incidents_status ON incidents(status);

-- ============================================================================
-- Audit trail (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS audit_log (
    id TEXT PRIMARY KEY,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    target_type TEXT NOT NULL,
    target_id TEXT NOT NULL,
    client_id TEXT,                              -- no FK: entries outlive their client
    detail TEXT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Entries are append-only; the only way out is DELETE (Admin, re-audited)
CREATE TRIGGER IF NOT EXISTS audit_log_immutable BEFORE UPDATE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'Audit entries are immutable');
END;

CREATE INDEX IF NOT EXISTS idx_audit_target_type ON audit_log(target_type);
CREATE INDEX IF NOT EXISTS idx_audit_client ON audit_log(client_id);
CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_quantity_cannot_go_negative() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO clients (id, full_name, age, room_number, care_type, admission_date)
             VALUES ('c1', 'Edith Moore', 84, '12', 'Residential', '2024-03-01')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO medications (id, client_id, medication_name, caregiver_name, quantity)
             VALUES ('m1', 'c1', 'Paracetamol', 'Sam', 0)",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE medications SET quantity = quantity - 1 WHERE id = 'm1'", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_log_update_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO audit_log (id, actor, action, target_type, target_id)
             VALUES ('a1', 'admin@example.com', 'Created medication', 'Medication', 'm1')",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE audit_log SET action = 'tampered' WHERE id = 'a1'", []);
        assert!(result.is_err());

        // Delete is still possible (governed at the policy layer)
        let deleted = conn
            .execute("DELETE FROM audit_log WHERE id = 'a1'", [])
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_room_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO clients (id, full_name, age, room_number, care_type, admission_date)
             VALUES ('c1', 'Edith Moore', 84, '12', 'Residential', '2024-03-01')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO clients (id, full_name, age, room_number, care_type, admission_date)
             VALUES ('c2', 'Ron Pike', 79, '12', 'Nursing', '2024-04-01')",
            [],
        );
        assert!(result.is_err());
    }
}
