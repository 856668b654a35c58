use serde::Serialize;
use utoipa::ToSchema;

use crate::model::permission_request::{PermissionStatus, PermissionView};

/// Filtered requests plus per-status counts, as shown on the reports page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionReport {
    #[schema(example = 3)]
    pub total: usize,
    #[schema(example = 1)]
    pub pending: usize,
    #[schema(example = 1)]
    pub approved: usize,
    #[schema(example = 1)]
    pub rejected: usize,
    pub data: Vec<PermissionView>,
}

impl PermissionReport {
    pub fn from_views(data: Vec<PermissionView>) -> Self {
        let count = |status: PermissionStatus| data.iter().filter(|v| v.status == status).count();

        Self {
            total: data.len(),
            pending: count(PermissionStatus::Pending),
            approved: count(PermissionStatus::Approved),
            rejected: count(PermissionStatus::Rejected),
            data,
        }
    }
}
