use async_trait::async_trait;
use sqlx::MySqlPool;
use thiserror::Error;
use tracing::{error, info};

use crate::model::role::Role;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity account for {0}")]
    UnknownAccount(String),
    #[error("email {0} is already linked to another account")]
    EmailInUse(String),
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}

/// Account-side collaborator for worker records. Sign-in itself happens
/// elsewhere; this only keeps accounts in step with the worker table.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an unverified worker account for `email`.
    async fn provision(&self, email: &str, worker_id: u64) -> Result<(), IdentityError>;

    /// Moves the account to `new`; the new address must be verified again.
    async fn change_email(&self, current: &str, new: &str) -> Result<(), IdentityError>;

    /// Removes the account. Unknown emails are not an error.
    async fn revoke(&self, email: &str) -> Result<(), IdentityError>;
}

/// Account directory kept in the `users` table.
pub struct SqlIdentityDirectory {
    pool: MySqlPool,
}

impl SqlIdentityDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn classify(e: sqlx::Error, email: &str) -> IdentityError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return IdentityError::EmailInUse(email.to_string());
        }
    }
    error!(error = %e, "Identity directory query failed");
    IdentityError::Unavailable(e.to_string())
}

#[async_trait]
impl IdentityProvider for SqlIdentityDirectory {
    async fn provision(&self, email: &str, worker_id: u64) -> Result<(), IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO users (email, role_id, worker_id, email_verified)
            VALUES (?, ?, ?, FALSE)
            "#,
        )
        .bind(email)
        .bind(Role::Worker.id())
        .bind(worker_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, email))?;

        info!(worker_id, "Identity account provisioned, awaiting verification");
        Ok(())
    }

    async fn change_email(&self, current: &str, new: &str) -> Result<(), IdentityError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, email_verified = FALSE
            WHERE email = ?
            "#,
        )
        .bind(new)
        .bind(current)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, new))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UnknownAccount(current.to_string()));
        }

        info!("Identity email changed, re-verification required");
        Ok(())
    }

    async fn revoke(&self, email: &str) -> Result<(), IdentityError> {
        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, email))?;
        Ok(())
    }
}
