use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::auth::identity::IdentityError;

/// Failures reported by a storage adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("referenced record does not exist: {0}")]
    InvalidReference(String),
    #[error("could not decode stored record: {0}")]
    Decode(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::ConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::InvalidReference(db_err.message().to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("not allowed to {action}")]
    Authorization { action: &'static str },
    #[error("permission request {id} has already been decided and can no longer be {action}")]
    InvalidState { id: u64, action: &'static str },
    #[error("permission request {id} was already resolved; the new decision was not recorded")]
    AlreadyDecided { id: u64 },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error(transparent)]
    Storage(StoreError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl WorkflowError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(action: &'static str) -> Self {
        WorkflowError::Authorization { action }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidReference(detail) => WorkflowError::validation(
                "reference",
                format!("cause, permission type or workplace does not exist ({detail})"),
            ),
            other => WorkflowError::Storage(other),
        }
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation { .. } => StatusCode::BAD_REQUEST,
            WorkflowError::Authorization { .. } => StatusCode::FORBIDDEN,
            WorkflowError::InvalidState { .. } | WorkflowError::AlreadyDecided { .. } => {
                StatusCode::CONFLICT
            }
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::Identity(IdentityError::EmailInUse(_)) => StatusCode::CONFLICT,
            WorkflowError::Identity(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            WorkflowError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            WorkflowError::Identity(e) => {
                tracing::warn!(error = %e, "Identity provider refused the change");
                e.to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
