//! Medication records, stock state and administration events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether the current round of a medication has been given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationStatus {
    /// No dose given yet (or the last recorded event was not given)
    Pending,
    /// At least one dose has been given
    Completed,
}

/// Dosing schedule as captured at intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub frequency: Option<String>,
    pub times: Vec<String>,
}

/// Stock counter for a medication.
///
/// Invariant: `quantity` never goes negative. One unit moves per given-flag
/// flip, and over-decrement clamps at zero rather than erroring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    pub quantity: u32,
    /// Alert when quantity drops below this.
    pub threshold: u32,
}

impl Default for Stock {
    fn default() -> Self {
        Self {
            quantity: 0,
            threshold: 5,
        }
    }
}

impl Stock {
    /// Low-stock is always recomputed from current state, never stored.
    pub fn is_low(&self) -> bool {
        self.quantity < self.threshold
    }
}

/// A prescribed medication for a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub client_id: String,
    pub medication_name: String,
    pub caregiver_name: String,
    pub status: MedicationStatus,
    pub schedule: Schedule,
    pub stock: Stock,
    /// Object-store URLs; upload/delete is the store collaborator's concern.
    pub attachments: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Medication {
    pub fn new(client_id: String, medication_name: String, caregiver_name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id,
            medication_name,
            caregiver_name,
            status: MedicationStatus::Pending,
            schedule: Schedule::default(),
            stock: Stock::default(),
            attachments: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// One recorded administration (or refusal) of a dose.
///
/// Rows are immutable once written except through the explicit amend and
/// reverse flows, which also move stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Administration {
    pub id: String,
    pub medication_id: String,
    pub client_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub given: bool,
    pub caregiver: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Administration {
    pub fn new(medication_id: String, client_id: String, dose: DoseRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id,
            client_id,
            date: dose.date,
            time: dose.time,
            given: dose.given,
            caregiver: dose.caregiver,
            notes: dose.notes,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Input for recording or amending an administration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseRecord {
    pub date: NaiveDate,
    pub time: String,
    pub given: bool,
    pub caregiver: String,
    pub notes: Option<String>,
}

/// Low-stock report across all medications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockReport {
    pub low_stock_items: Vec<Medication>,
    pub has_low_stock: bool,
    pub total_low_stock: usize,
}

impl LowStockReport {
    pub fn from_items(low_stock_items: Vec<Medication>) -> Self {
        Self {
            has_low_stock: !low_stock_items.is_empty(),
            total_low_stock: low_stock_items.len(),
            low_stock_items,
        }
    }
}

/// Render administration history as CSV, one `date,time,given,caregiver`
/// line per event in recorded order.
pub fn history_csv(history: &[Administration]) -> String {
    history
        .iter()
        .map(|entry| {
            format!(
                "{},{},{},{}",
                entry.date, entry.time, entry.given, entry.caregiver
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stock() {
        let stock = Stock::default();
        assert_eq!(stock.quantity, 0);
        assert_eq!(stock.threshold, 5);
        assert!(stock.is_low());
    }

    #[test]
    fn test_low_stock_boundary() {
        // Strictly below threshold, not at it
        let stock = Stock {
            quantity: 5,
            threshold: 5,
        };
        assert!(!stock.is_low());

        let stock = Stock {
            quantity: 4,
            threshold: 5,
        };
        assert!(stock.is_low());
    }

    #[test]
    fn test_history_csv() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let history = vec![
            Administration {
                id: "a1".into(),
                medication_id: "m1".into(),
                client_id: "c1".into(),
                date,
                time: "08:00".into(),
                given: true,
                caregiver: "Sam".into(),
                notes: None,
                created_at: "2024-07-01T08:00:00Z".into(),
            },
            Administration {
                id: "a2".into(),
                medication_id: "m1".into(),
                client_id: "c1".into(),
                date,
                time: "20:00".into(),
                given: false,
                caregiver: "Alex".into(),
                notes: None,
                created_at: "2024-07-01T20:00:00Z".into(),
            },
        ];

        let csv = history_csv(&history);
        assert_eq!(
            csv,
            "2024-07-01,08:00,true,Sam\n2024-07-01,20:00,false,Alex"
        );
    }

    #[test]
    fn test_low_stock_report() {
        let report = LowStockReport::from_items(vec![]);
        assert!(!report.has_low_stock);
        assert_eq!(report.total_low_stock, 0);
    }
}
