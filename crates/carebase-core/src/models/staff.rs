//! Staff (HR) profiles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An HR record for a member of staff.
///
/// Training, performance and staff documents carry an owning `staff_id`
/// pointing here; a Staff caller's `staff_ref` scopes them to this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub start_date: NaiveDate,
    pub care_setting: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub dbs_status: Option<String>,
    pub right_to_work_status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StaffProfile {
    pub fn new(
        full_name: String,
        email: String,
        position: String,
        department: String,
        start_date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            email,
            position,
            department,
            start_date,
            care_setting: None,
            contact_number: None,
            address: None,
            dbs_status: None,
            right_to_work_status: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Listing shape for staff profiles, with the headcount the directory
/// screens display alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffDirectory {
    pub staff: Vec<StaffProfile>,
    pub total_staff: usize,
}

impl StaffDirectory {
    pub fn from_staff(staff: Vec<StaffProfile>) -> Self {
        Self {
            total_staff: staff.len(),
            staff,
        }
    }
}
