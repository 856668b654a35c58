use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::approval::{Approval, NewApproval};
use crate::model::permission_request::{PermissionFields, PermissionRequest, RequestRow};

/// Storage collaborator for permission requests and their approvals.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn insert_request(
        &self,
        worker_id: u64,
        submitted_date: NaiveDate,
        fields: &PermissionFields,
    ) -> Result<PermissionRequest, StoreError>;

    async fn find_request(&self, id: u64) -> Result<Option<PermissionRequest>, StoreError>;

    /// Updates the request only while no approval exists for it.
    ///
    /// `NotFound` if the request is gone, `ConstraintViolation` if it has
    /// been decided.
    async fn update_request(&self, id: u64, fields: &PermissionFields) -> Result<(), StoreError>;

    /// Removes the request and its approvals. Absent ids are not an error.
    async fn delete_request(&self, id: u64) -> Result<(), StoreError>;

    /// Requests joined with their worker, in id order; all workers when
    /// `worker_id` is `None`.
    async fn list_requests(&self, worker_id: Option<u64>) -> Result<Vec<RequestRow>, StoreError>;

    /// Approvals for the given requests, in id order.
    async fn approvals_for(&self, request_ids: &[u64]) -> Result<Vec<Approval>, StoreError>;

    /// `ConstraintViolation` when the store refuses a second approval for the
    /// same request.
    async fn insert_approval(&self, approval: &NewApproval) -> Result<Approval, StoreError>;

    async fn delete_approval(&self, id: u64) -> Result<(), StoreError>;

    /// Whether `insert_approval` itself guarantees one approval per request.
    fn enforces_unique_decision(&self) -> bool;
}
