use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Approved,
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Approved => "approved",
            Outcome::Rejected => "rejected",
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Outcome::Approved),
            "rejected" => Ok(Outcome::Rejected),
            _ => Err(format!("invalid outcome: {s}")),
        }
    }
}

/// A manager's decision on one permission request. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "permission_request_id": 1,
    "manager_id": 2,
    "outcome": "rejected",
    "decided_date": "2025-03-02"
}))]
pub struct Approval {
    pub id: u64,
    pub permission_request_id: u64,
    pub manager_id: u64,
    pub outcome: Outcome,
    #[schema(value_type = String, format = "date")]
    pub decided_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApproval {
    pub permission_request_id: u64,
    pub manager_id: u64,
    pub outcome: Outcome,
    pub decided_date: NaiveDate,
}

impl NewApproval {
    pub fn with_id(&self, id: u64) -> Approval {
        Approval {
            id,
            permission_request_id: self.permission_request_id,
            manager_id: self.manager_id,
            outcome: self.outcome,
            decided_date: self.decided_date,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DecisionPayload {
    #[schema(example = "approved")]
    pub outcome: Outcome,
}
