//! Staff training records and expiry status derivation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days before expiry at which a record counts as expiring soon.
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

/// Derived expiry state of a training record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

impl TrainingStatus {
    /// Classify an expiry date against a reference day.
    ///
    /// Pure function of its inputs: for a fixed `today` the result is the
    /// same however many times it is invoked, which is what makes the bulk
    /// refresh idempotent.
    pub fn derive(expiry_date: NaiveDate, today: NaiveDate) -> Self {
        let days_remaining = (expiry_date - today).num_days();
        if days_remaining < 0 {
            TrainingStatus::Expired
        } else if days_remaining <= EXPIRING_SOON_WINDOW_DAYS {
            TrainingStatus::ExpiringSoon
        } else {
            TrainingStatus::Valid
        }
    }
}

/// A completed training course for a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
    pub id: String,
    pub staff_id: String,
    pub training_type: String,
    pub completion_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Always recomputed from `expiry_date`; a caller-supplied value does
    /// not survive the deriver.
    pub status: TrainingStatus,
    pub notes: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TrainingRecord {
    pub fn new(
        staff_id: String,
        training_type: String,
        completion_date: NaiveDate,
        expiry_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            staff_id,
            training_type,
            completion_date,
            expiry_date,
            status: TrainingStatus::derive(expiry_date, today),
            notes: None,
            attachments: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Recompute `status` for the given day. Returns true if it changed.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let derived = TrainingStatus::derive(self.expiry_date, today);
        if derived != self.status {
            self.status = derived;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_derive_expired() {
        let today = day(2024, 6, 15);
        assert_eq!(
            TrainingStatus::derive(day(2024, 6, 14), today),
            TrainingStatus::Expired
        );
    }

    #[test]
    fn test_derive_expiring_soon_window() {
        let today = day(2024, 6, 15);
        // Expiring today counts as expiring soon, not expired
        assert_eq!(
            TrainingStatus::derive(today, today),
            TrainingStatus::ExpiringSoon
        );
        // Day 30 is inside the window, day 31 is not
        assert_eq!(
            TrainingStatus::derive(today.checked_add_days(Days::new(30)).unwrap(), today),
            TrainingStatus::ExpiringSoon
        );
        assert_eq!(
            TrainingStatus::derive(today.checked_add_days(Days::new(31)).unwrap(), today),
            TrainingStatus::Valid
        );
    }

    #[test]
    fn test_derive_deterministic() {
        let today = day(2024, 6, 15);
        let expiry = day(2024, 9, 1);
        let first = TrainingStatus::derive(expiry, today);
        for _ in 0..10 {
            assert_eq!(TrainingStatus::derive(expiry, today), first);
        }
    }

    #[test]
    fn test_refresh_status_reports_change() {
        let today = day(2024, 6, 15);
        let mut record = TrainingRecord::new(
            "staff-1".into(),
            "First Aid".into(),
            day(2023, 6, 15),
            day(2024, 9, 1),
            today,
        );
        assert_eq!(record.status, TrainingStatus::Valid);
        assert!(!record.refresh_status(today));

        // Move time forward past expiry
        assert!(record.refresh_status(day(2024, 9, 2)));
        assert_eq!(record.status, TrainingStatus::Expired);
    }
}
