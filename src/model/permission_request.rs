use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WorkflowError;
use crate::model::approval::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "worker_id": 7,
    "requested_date": "2025-03-10",
    "submitted_date": "2025-03-01",
    "cause_id": 1,
    "permission_type_id": 2,
    "workplace_id": 1
}))]
pub struct PermissionRequest {
    pub id: u64,
    pub worker_id: u64,
    /// the day off
    #[schema(value_type = String, format = "date")]
    pub requested_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub submitted_date: NaiveDate,
    pub cause_id: u64,
    pub permission_type_id: u64,
    pub workplace_id: u64,
}

/// Payload for submitting or editing a request. Every field is required;
/// they are optional here so a missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PermissionForm {
    #[schema(example = "2025-03-10", format = "date", value_type = String)]
    pub requested_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub cause_id: Option<u64>,
    #[schema(example = 2)]
    pub permission_type_id: Option<u64>,
    #[schema(example = 1)]
    pub workplace_id: Option<u64>,
}

/// The mutable part of a request, after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionFields {
    pub requested_date: NaiveDate,
    pub cause_id: u64,
    pub permission_type_id: u64,
    pub workplace_id: u64,
}

fn reference(value: Option<u64>, field: &'static str) -> Result<u64, WorkflowError> {
    match value {
        Some(id) if id > 0 => Ok(id),
        _ => Err(WorkflowError::validation(field, "a selection is required")),
    }
}

impl PermissionForm {
    pub fn validate(&self) -> Result<PermissionFields, WorkflowError> {
        let requested_date = self
            .requested_date
            .ok_or_else(|| WorkflowError::validation("requested_date", "a date is required"))?;

        Ok(PermissionFields {
            requested_date,
            cause_id: reference(self.cause_id, "cause_id")?,
            permission_type_id: reference(self.permission_type_id, "permission_type_id")?,
            workplace_id: reference(self.workplace_id, "workplace_id")?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Pending => "pending",
            PermissionStatus::Approved => "approved",
            PermissionStatus::Rejected => "rejected",
        }
    }
}

impl From<Outcome> for PermissionStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Approved => PermissionStatus::Approved,
            Outcome::Rejected => PermissionStatus::Rejected,
        }
    }
}

impl FromStr for PermissionStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PermissionStatus::Pending),
            "approved" => Ok(PermissionStatus::Approved),
            "rejected" => Ok(PermissionStatus::Rejected),
            _ => Err(WorkflowError::validation(
                "status",
                format!("unknown status '{s}', expected pending, approved or rejected"),
            )),
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity columns of the owning worker, joined onto each listed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkerSummary {
    #[schema(example = "12345678")]
    pub rut: String,
    #[schema(example = "5")]
    pub dv: String,
    pub given_name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
}

impl WorkerSummary {
    /// `rut-dv`, the form managers search by.
    pub fn identifier(&self) -> String {
        format!("{}-{}", self.rut, self.dv)
    }
}

/// Display names of the lookups a request points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RequestLabels {
    #[schema(example = "Trámite personal")]
    pub cause: String,
    #[schema(example = "Día administrativo")]
    pub permission_type: String,
    #[schema(example = "Sede central")]
    pub workplace: String,
}

/// A request as read from storage, before its status is derived.
#[derive(Debug, Clone)]
pub struct RequestRow {
    pub request: PermissionRequest,
    pub worker: WorkerSummary,
    pub labels: RequestLabels,
}

/// A request with its derived status, as listed to workers and managers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionView {
    #[serde(flatten)]
    pub request: PermissionRequest,
    pub worker: WorkerSummary,
    pub labels: RequestLabels,
    pub status: PermissionStatus,
    #[schema(value_type = Option<String>, format = "date")]
    pub decided_date: Option<NaiveDate>,
    /// More than one decision is on record for this request.
    pub conflicting_decisions: bool,
}
