use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::store::PermissionStore;
use crate::error::StoreError;
use crate::model::approval::{Approval, NewApproval};
use crate::model::permission_request::{
    PermissionFields, PermissionRequest, RequestLabels, RequestRow, WorkerSummary,
};

#[derive(Default)]
struct State {
    next_request_id: u64,
    next_approval_id: u64,
    workers: HashMap<u64, WorkerSummary>,
    requests: Vec<PermissionRequest>,
    approvals: Vec<Approval>,
    /// Inserted just before the next `insert_approval`, standing in for a
    /// manager whose decision lands after our pre-read.
    racing_decision: Option<NewApproval>,
}

impl State {
    fn push_approval(&mut self, approval: &NewApproval) -> Approval {
        self.next_approval_id += 1;
        let stored = approval.with_id(self.next_approval_id);
        self.approvals.push(stored.clone());
        stored
    }
}

/// In-memory `PermissionStore` for tests.
pub(crate) struct MemoryPermissionStore {
    state: Mutex<State>,
    unique_decisions: bool,
}

impl MemoryPermissionStore {
    /// A store that refuses a second approval for a request.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            unique_decisions: true,
        }
    }

    /// A store with no uniqueness guard on approvals.
    pub(crate) fn without_unique_decisions() -> Self {
        Self {
            unique_decisions: false,
            ..Self::new()
        }
    }

    pub(crate) fn add_worker(&self, id: u64, rut: &str, dv: &str) {
        self.state.lock().unwrap().workers.insert(
            id,
            WorkerSummary {
                rut: rut.to_string(),
                dv: dv.to_string(),
                given_name: format!("Worker {id}"),
                paternal_surname: "Rojas".to_string(),
                maternal_surname: "Soto".to_string(),
            },
        );
    }

    pub(crate) fn race_next_decision(&self, approval: NewApproval) {
        self.state.lock().unwrap().racing_decision = Some(approval);
    }

    /// Writes an approval directly, bypassing any guard.
    pub(crate) fn seed_approval(&self, approval: NewApproval) -> Approval {
        self.state.lock().unwrap().push_approval(&approval)
    }

    pub(crate) fn approvals(&self) -> Vec<Approval> {
        self.state.lock().unwrap().approvals.clone()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn insert_request(
        &self,
        worker_id: u64,
        submitted_date: NaiveDate,
        fields: &PermissionFields,
    ) -> Result<PermissionRequest, StoreError> {
        let mut state = self.state.lock().unwrap();
        if !state.workers.contains_key(&worker_id) {
            return Err(StoreError::InvalidReference(format!("worker {worker_id}")));
        }

        state.next_request_id += 1;
        let request = PermissionRequest {
            id: state.next_request_id,
            worker_id,
            requested_date: fields.requested_date,
            submitted_date,
            cause_id: fields.cause_id,
            permission_type_id: fields.permission_type_id,
            workplace_id: fields.workplace_id,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: u64) -> Result<Option<PermissionRequest>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_request(&self, id: u64, fields: &PermissionFields) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.approvals.iter().any(|a| a.permission_request_id == id) {
            return Err(StoreError::ConstraintViolation(format!("request {id} decided")));
        }

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        request.requested_date = fields.requested_date;
        request.cause_id = fields.cause_id;
        request.permission_type_id = fields.permission_type_id;
        request.workplace_id = fields.workplace_id;
        Ok(())
    }

    async fn delete_request(&self, id: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.requests.retain(|r| r.id != id);
        state.approvals.retain(|a| a.permission_request_id != id);
        Ok(())
    }

    async fn list_requests(&self, worker_id: Option<u64>) -> Result<Vec<RequestRow>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .requests
            .iter()
            .filter(|r| worker_id.is_none_or(|id| r.worker_id == id))
            .map(|r| RequestRow {
                request: r.clone(),
                worker: state.workers[&r.worker_id].clone(),
                labels: RequestLabels {
                    cause: format!("Cause {}", r.cause_id),
                    permission_type: format!("Type {}", r.permission_type_id),
                    workplace: format!("Workplace {}", r.workplace_id),
                },
            })
            .collect())
    }

    async fn approvals_for(&self, request_ids: &[u64]) -> Result<Vec<Approval>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .approvals
            .iter()
            .filter(|a| request_ids.contains(&a.permission_request_id))
            .cloned()
            .collect())
    }

    async fn insert_approval(&self, approval: &NewApproval) -> Result<Approval, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(racing) = state.racing_decision.take() {
            state.push_approval(&racing);
        }

        if !state
            .requests
            .iter()
            .any(|r| r.id == approval.permission_request_id)
        {
            return Err(StoreError::InvalidReference(format!(
                "permission request {}",
                approval.permission_request_id
            )));
        }

        if self.unique_decisions
            && state
                .approvals
                .iter()
                .any(|a| a.permission_request_id == approval.permission_request_id)
        {
            return Err(StoreError::ConstraintViolation(
                "duplicate entry for approvals.permission_request_id".to_string(),
            ));
        }

        Ok(state.push_approval(approval))
    }

    async fn delete_approval(&self, id: u64) -> Result<(), StoreError> {
        self.state.lock().unwrap().approvals.retain(|a| a.id != id);
        Ok(())
    }

    fn enforces_unique_decision(&self) -> bool {
        self.unique_decisions
    }
}
