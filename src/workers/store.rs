use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::worker::{NewWorker, Worker, WorkerUpdate};

#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// `ConstraintViolation` when the email or RUT is already registered.
    async fn insert_worker(&self, worker: &NewWorker) -> Result<Worker, StoreError>;

    async fn find_worker(&self, id: u64) -> Result<Option<Worker>, StoreError>;

    /// Writes only the fields present in `changes`.
    async fn update_worker(
        &self,
        current: &Worker,
        changes: &WorkerUpdate,
    ) -> Result<(), StoreError>;

    /// Removes the worker with their requests. Absent ids are not an error.
    async fn delete_worker(&self, worker: &Worker) -> Result<(), StoreError>;

    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError>;

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError>;
}
