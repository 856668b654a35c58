use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WorkflowError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager = 1,
    Worker = 2,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Manager),
            2 => Some(Role::Worker),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

/// The caller on whose behalf a workflow operation runs.
///
/// `id` is the worker id for workers and the manager id for managers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

impl Actor {
    pub const fn worker(id: u64) -> Self {
        Self { id, role: Role::Worker }
    }

    pub const fn manager(id: u64) -> Self {
        Self { id, role: Role::Manager }
    }

    pub fn require(&self, role: Role, action: &'static str) -> Result<(), WorkflowError> {
        if self.role == role {
            Ok(())
        } else {
            Err(WorkflowError::forbidden(action))
        }
    }
}
