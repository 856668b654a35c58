pub mod mysql;
pub mod store;


use std::sync::Arc;

use tracing::{error, info};

use crate::auth::identity::IdentityProvider;
use crate::error::{StoreError, WorkflowError};
use crate::model::role::{Actor, Role};
use crate::model::worker::{NewWorker, Worker, WorkerUpdate};

use store::WorkerStore;

/// Manager-side registration and maintenance of worker records.
pub struct WorkerRegistry {
    store: Arc<dyn WorkerStore>,
    identity: Arc<dyn IdentityProvider>,
}

/// Maps a unique-key violation to the field it guards, using the key name in
/// the database message (`uq_workers_rut` / `uq_workers_email`).
fn duplicate(e: StoreError) -> WorkflowError {
    match e {
        StoreError::ConstraintViolation(detail) if detail.contains("uq_workers_rut") => {
            WorkflowError::validation("rut", "a worker with this RUT is already registered")
        }
        StoreError::ConstraintViolation(_) => {
            WorkflowError::validation("email", "a worker with this email is already registered")
        }
        other => other.into(),
    }
}

impl WorkerRegistry {
    pub fn new(store: Arc<dyn WorkerStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub async fn register(&self, actor: &Actor, input: &NewWorker) -> Result<Worker, WorkflowError> {
        actor.require(Role::Manager, "register workers")?;
        let input = input.normalized()?;

        self.ensure_email_available(&input.email).await?;

        let worker = self.store.insert_worker(&input).await.map_err(duplicate)?;

        if let Err(e) = self.identity.provision(&worker.email, worker.id).await {
            error!(error = %e, worker_id = worker.id, "Account provisioning failed, removing worker");
            self.store.delete_worker(&worker).await?;
            return Err(e.into());
        }

        info!(worker_id = worker.id, manager_id = actor.id, "Worker registered");
        Ok(worker)
    }

    /// Applies a partial update. An email change goes through the identity
    /// provider first and leaves the record untouched if it is refused; a
    /// failed row write moves the account back to the old email.
    pub async fn update(
        &self,
        actor: &Actor,
        id: u64,
        update: &WorkerUpdate,
    ) -> Result<Worker, WorkflowError> {
        actor.require(Role::Manager, "edit workers")?;
        let current = self.get(actor, id).await?;

        let next = update.merge(&current).normalized()?;
        let changes = WorkerUpdate::diff(&current, next);
        if changes.is_empty() {
            return Ok(current);
        }

        if let Some(email) = &changes.email {
            self.ensure_email_available(email).await?;
            self.identity.change_email(&current.email, email).await?;
        }

        if let Err(e) = self.store.update_worker(&current, &changes).await {
            if let Some(email) = &changes.email {
                // put the account back on the address the row still holds
                if let Err(undo) = self.identity.change_email(email, &current.email).await {
                    error!(error = %undo, worker_id = id, "Could not restore account email");
                }
            }
            return Err(duplicate(e));
        }

        info!(worker_id = id, manager_id = actor.id, email_changed = changes.email.is_some(), "Worker updated");
        Ok(changes.apply(&current))
    }

    pub async fn delete(&self, actor: &Actor, id: u64) -> Result<(), WorkflowError> {
        actor.require(Role::Manager, "delete workers")?;
        let worker = self.get(actor, id).await?;

        self.store.delete_worker(&worker).await?;
        self.identity.revoke(&worker.email).await?;

        info!(worker_id = id, manager_id = actor.id, "Worker deleted");
        Ok(())
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Worker>, WorkflowError> {
        actor.require(Role::Manager, "list workers")?;
        Ok(self.store.list_workers().await?)
    }

    pub async fn get(&self, actor: &Actor, id: u64) -> Result<Worker, WorkflowError> {
        actor.require(Role::Manager, "view workers")?;
        self.store
            .find_worker(id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "worker", id })
    }

    async fn ensure_email_available(&self, email: &str) -> Result<(), WorkflowError> {
        if self.store.email_taken(email).await? {
            return Err(WorkflowError::validation("email", "already registered"));
        }
        Ok(())
    }
}
