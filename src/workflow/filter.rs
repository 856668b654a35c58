use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::WorkflowError;
use crate::model::permission_request::{PermissionStatus, PermissionView};

/// Manager-side filter over listed requests. Every criterion is optional and
/// all present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerFilter {
    pub status: Option<PermissionStatus>,
    /// substring of `rut-dv`, case-insensitive
    pub identifier: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ManagerFilter {
    pub fn matches(&self, view: &PermissionView) -> bool {
        if self.status.is_some_and(|status| status != view.status) {
            return false;
        }

        if let Some(needle) = &self.identifier {
            let identifier = view.worker.identifier().to_lowercase();
            if !identifier.contains(&needle.to_lowercase()) {
                return false;
            }
        }

        let day = view.request.requested_date;
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ManagerFilterQuery {
    #[schema(example = "pending")]
    /// Filter by status: pending, approved or rejected
    pub status: Option<String>,
    #[schema(example = "12345678")]
    /// Substring of the worker's RUT (`12345678-5`)
    pub identifier: Option<String>,
    #[schema(example = "2025-03-01", format = "date", value_type = Option<String>)]
    /// First requested date to include
    pub from: Option<NaiveDate>,
    #[schema(example = "2025-03-31", format = "date", value_type = Option<String>)]
    /// Last requested date to include
    pub to: Option<NaiveDate>,
}

impl TryFrom<ManagerFilterQuery> for ManagerFilter {
    type Error = WorkflowError;

    fn try_from(query: ManagerFilterQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse()?),
        };

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(WorkflowError::validation("from", "must not be after 'to'"));
            }
        }

        Ok(ManagerFilter {
            status,
            identifier: query
                .identifier
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            from: query.from,
            to: query.to,
        })
    }
}
