//! Care plans and the client acknowledgment flow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Acknowledgment state of a care plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Awaiting the client's decision
    Pending,
    /// Accepted and signed by the client
    Accepted,
    /// Declined by the client
    Declined,
}

/// A care plan for a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarePlan {
    pub id: String,
    pub client_id: String,
    pub plan_type: String,
    pub creation_date: NaiveDate,
    pub review_date: Option<NaiveDate>,
    pub details: Option<String>,
    pub care_setting: Option<String>,
    pub status: PlanStatus,
    /// Present once the plan is Accepted.
    pub signature: Option<String>,
    /// Present once the plan is Declined.
    pub decline_reason: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CarePlan {
    pub fn new(client_id: String, plan_type: String, creation_date: NaiveDate) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id,
            plan_type,
            creation_date,
            review_date: None,
            details: None,
            care_setting: None,
            status: PlanStatus::Pending,
            signature: None,
            decline_reason: None,
            attachments: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Apply a client decision to this plan.
    pub fn apply_decision(&mut self, decision: PlanDecision) {
        match decision {
            PlanDecision::Accepted { signature } => {
                self.status = PlanStatus::Accepted;
                self.signature = Some(signature);
            }
            PlanDecision::Declined { reason } => {
                self.status = PlanStatus::Declined;
                self.decline_reason = Some(reason);
            }
        }
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// A client's decision on their care plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PlanDecision {
    Accepted { signature: String },
    Declined { reason: String },
}
