pub mod filter;
pub mod mysql;
pub mod report;
pub mod status;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{StoreError, WorkflowError};
use crate::model::approval::{Approval, NewApproval, Outcome};
use crate::model::permission_request::{
    PermissionForm, PermissionRequest, PermissionView, RequestRow,
};
use crate::model::role::{Actor, Role};

use filter::ManagerFilter;
use report::PermissionReport;
use store::PermissionStore;

pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Lifecycle of permission requests: submission, edits and deletion by the
/// owning worker, and a single approve/reject decision by a manager.
///
/// Holds no state between calls; the store is the only shared resource.
pub struct PermissionWorkflow {
    store: Arc<dyn PermissionStore>,
    today: Clock,
}

impl PermissionWorkflow {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self::with_clock(store, Arc::new(|| Local::now().date_naive()))
    }

    pub fn with_clock(store: Arc<dyn PermissionStore>, today: Clock) -> Self {
        Self { store, today }
    }

    pub async fn submit(
        &self,
        actor: &Actor,
        form: &PermissionForm,
    ) -> Result<PermissionRequest, WorkflowError> {
        actor.require(Role::Worker, "submit permission requests")?;
        let fields = form.validate()?;

        let request = self
            .store
            .insert_request(actor.id, (self.today)(), &fields)
            .await?;

        info!(
            request_id = request.id,
            worker_id = actor.id,
            requested_date = %request.requested_date,
            "Permission request submitted"
        );
        Ok(request)
    }

    pub async fn edit(
        &self,
        actor: &Actor,
        request_id: u64,
        form: &PermissionForm,
    ) -> Result<PermissionRequest, WorkflowError> {
        actor.require(Role::Worker, "edit permission requests")?;
        let request = self
            .owned_request(actor, request_id, "edit another worker's permission request")
            .await?;

        if !self.store.approvals_for(&[request_id]).await?.is_empty() {
            return Err(WorkflowError::InvalidState {
                id: request_id,
                action: "edited",
            });
        }

        let fields = form.validate()?;

        match self.store.update_request(request_id, &fields).await {
            Ok(()) => {}
            Err(StoreError::ConstraintViolation(_)) => {
                return Err(WorkflowError::InvalidState {
                    id: request_id,
                    action: "edited",
                });
            }
            Err(StoreError::NotFound) => return Err(not_found(request_id)),
            Err(e) => return Err(e.into()),
        }

        info!(request_id, worker_id = actor.id, "Permission request edited");
        Ok(PermissionRequest {
            requested_date: fields.requested_date,
            cause_id: fields.cause_id,
            permission_type_id: fields.permission_type_id,
            workplace_id: fields.workplace_id,
            ..request
        })
    }

    /// Deletes the request together with its decision, if any. Deleting an
    /// id that no longer exists succeeds.
    pub async fn delete(&self, actor: &Actor, request_id: u64) -> Result<(), WorkflowError> {
        actor.require(Role::Worker, "delete permission requests")?;

        match self.store.find_request(request_id).await? {
            None => {
                debug!(request_id, "Permission request already absent");
                Ok(())
            }
            Some(request) if request.worker_id != actor.id => Err(WorkflowError::forbidden(
                "delete another worker's permission request",
            )),
            Some(_) => {
                self.store.delete_request(request_id).await?;
                info!(request_id, worker_id = actor.id, "Permission request deleted");
                Ok(())
            }
        }
    }

    /// The actor's own requests, latest requested date first.
    pub async fn list_for_worker(&self, actor: &Actor) -> Result<Vec<PermissionView>, WorkflowError> {
        actor.require(Role::Worker, "list worker permission requests")?;

        let rows = self.store.list_requests(Some(actor.id)).await?;
        let mut views = self.with_status(rows).await?;
        views.sort_by(|a, b| b.request.requested_date.cmp(&a.request.requested_date));
        Ok(views)
    }

    pub async fn list_for_manager(
        &self,
        actor: &Actor,
        filter: &ManagerFilter,
    ) -> Result<Vec<PermissionView>, WorkflowError> {
        actor.require(Role::Manager, "review permission requests")?;

        let rows = self.store.list_requests(None).await?;
        let mut views = self.with_status(rows).await?;
        views.retain(|view| filter.matches(view));

        debug!(?filter, count = views.len(), "Listed permission requests for manager");
        Ok(views)
    }

    pub async fn report(
        &self,
        actor: &Actor,
        filter: &ManagerFilter,
    ) -> Result<PermissionReport, WorkflowError> {
        let views = self.list_for_manager(actor, filter).await?;
        Ok(PermissionReport::from_views(views))
    }

    /// Records the single decision for a pending request.
    ///
    /// The pre-read is a fast path; the store's uniqueness guarantee is what
    /// makes the decision exclusive. Stores without one get a post-insert
    /// check: an approval that is not the effective one under the status
    /// rule is withdrawn.
    pub async fn decide(
        &self,
        actor: &Actor,
        request_id: u64,
        outcome: Outcome,
    ) -> Result<Approval, WorkflowError> {
        actor.require(Role::Manager, "decide on permission requests")?;

        if self.store.find_request(request_id).await?.is_none() {
            return Err(not_found(request_id));
        }

        if !self.store.approvals_for(&[request_id]).await?.is_empty() {
            info!(request_id, manager_id = actor.id, "Decision refused: already resolved");
            return Err(WorkflowError::AlreadyDecided { id: request_id });
        }

        let new = NewApproval {
            permission_request_id: request_id,
            manager_id: actor.id,
            outcome,
            decided_date: (self.today)(),
        };

        let approval = match self.store.insert_approval(&new).await {
            Ok(approval) => approval,
            Err(StoreError::ConstraintViolation(reason)) => {
                warn!(request_id, manager_id = actor.id, %reason, "Concurrent decision rejected by store");
                return Err(WorkflowError::AlreadyDecided { id: request_id });
            }
            Err(StoreError::InvalidReference(_)) => return Err(not_found(request_id)),
            Err(e) => return Err(e.into()),
        };

        if !self.store.enforces_unique_decision() {
            let recorded = self.store.approvals_for(&[request_id]).await?;
            if recorded.len() > 1 {
                warn!(request_id, approvals = recorded.len(), "Concurrent decisions recorded");
                let effective = status::effective_decision(&recorded).map(|a| a.id);
                if effective != Some(approval.id) {
                    self.store.delete_approval(approval.id).await?;
                    return Err(WorkflowError::AlreadyDecided { id: request_id });
                }
            }
        }

        info!(
            request_id,
            manager_id = actor.id,
            outcome = outcome.as_str(),
            "Permission request decided"
        );
        Ok(approval)
    }

    async fn owned_request(
        &self,
        actor: &Actor,
        request_id: u64,
        action: &'static str,
    ) -> Result<PermissionRequest, WorkflowError> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(|| not_found(request_id))?;

        if request.worker_id != actor.id {
            return Err(WorkflowError::forbidden(action));
        }
        Ok(request)
    }

    async fn with_status(&self, rows: Vec<RequestRow>) -> Result<Vec<PermissionView>, WorkflowError> {
        let ids: Vec<u64> = rows.iter().map(|row| row.request.id).collect();
        let mut by_request: HashMap<u64, Vec<Approval>> = HashMap::new();
        for approval in self.store.approvals_for(&ids).await? {
            by_request
                .entry(approval.permission_request_id)
                .or_default()
                .push(approval);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let approvals = by_request.remove(&row.request.id).unwrap_or_default();
                let derived = status::derive(&approvals);
                if derived.conflicting {
                    warn!(
                        request_id = row.request.id,
                        approvals = approvals.len(),
                        "Permission request carries more than one decision"
                    );
                }
                PermissionView {
                    request: row.request,
                    worker: row.worker,
                    labels: row.labels,
                    status: derived.status,
                    decided_date: derived.decided_date,
                    conflicting_decisions: derived.conflicting,
                }
            })
            .collect())
    }
}

fn not_found(id: u64) -> WorkflowError {
    WorkflowError::NotFound {
        entity: "permission request",
        id,
    }
}
