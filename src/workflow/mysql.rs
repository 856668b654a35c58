use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use super::store::PermissionStore;
use crate::error::StoreError;
use crate::model::approval::{Approval, NewApproval};
use crate::model::permission_request::{
    PermissionFields, PermissionRequest, RequestLabels, RequestRow, WorkerSummary,
};

pub struct MySqlPermissionStore {
    pool: MySqlPool,
}

impl MySqlPermissionStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RequestRecord {
    id: u64,
    worker_id: u64,
    requested_date: NaiveDate,
    submitted_date: NaiveDate,
    cause_id: u64,
    permission_type_id: u64,
    workplace_id: u64,
    rut: String,
    dv: String,
    given_name: String,
    paternal_surname: String,
    maternal_surname: String,
    cause: String,
    permission_type: String,
    workplace: String,
}

impl From<RequestRecord> for RequestRow {
    fn from(r: RequestRecord) -> Self {
        RequestRow {
            request: PermissionRequest {
                id: r.id,
                worker_id: r.worker_id,
                requested_date: r.requested_date,
                submitted_date: r.submitted_date,
                cause_id: r.cause_id,
                permission_type_id: r.permission_type_id,
                workplace_id: r.workplace_id,
            },
            worker: WorkerSummary {
                rut: r.rut,
                dv: r.dv,
                given_name: r.given_name,
                paternal_surname: r.paternal_surname,
                maternal_surname: r.maternal_surname,
            },
            labels: RequestLabels {
                cause: r.cause,
                permission_type: r.permission_type,
                workplace: r.workplace,
            },
        }
    }
}

#[derive(FromRow)]
struct ApprovalRecord {
    id: u64,
    permission_request_id: u64,
    manager_id: u64,
    outcome: String,
    decided_date: NaiveDate,
}

impl TryFrom<ApprovalRecord> for Approval {
    type Error = StoreError;

    fn try_from(r: ApprovalRecord) -> Result<Self, Self::Error> {
        Ok(Approval {
            id: r.id,
            permission_request_id: r.permission_request_id,
            manager_id: r.manager_id,
            outcome: r.outcome.parse().map_err(StoreError::Decode)?,
            decided_date: r.decided_date,
        })
    }
}

const REQUEST_COLUMNS: &str = r#"
    p.id, p.worker_id, p.requested_date, p.submitted_date,
    p.cause_id, p.permission_type_id, p.workplace_id,
    w.rut, w.dv, w.given_name, w.paternal_surname, w.maternal_surname,
    c.description AS cause, t.description AS permission_type, wp.name AS workplace
"#;

const REQUEST_JOINS: &str = r#"
    JOIN workers w ON w.id = p.worker_id
    JOIN causes c ON c.id = p.cause_id
    JOIN permission_types t ON t.id = p.permission_type_id
    JOIN workplaces wp ON wp.id = p.workplace_id
"#;

#[async_trait]
impl PermissionStore for MySqlPermissionStore {
    async fn insert_request(
        &self,
        worker_id: u64,
        submitted_date: NaiveDate,
        fields: &PermissionFields,
    ) -> Result<PermissionRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO permission_requests
                (worker_id, requested_date, submitted_date, cause_id, permission_type_id, workplace_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(worker_id)
        .bind(fields.requested_date)
        .bind(submitted_date)
        .bind(fields.cause_id)
        .bind(fields.permission_type_id)
        .bind(fields.workplace_id)
        .execute(&self.pool)
        .await?;

        Ok(PermissionRequest {
            id: result.last_insert_id(),
            worker_id,
            requested_date: fields.requested_date,
            submitted_date,
            cause_id: fields.cause_id,
            permission_type_id: fields.permission_type_id,
            workplace_id: fields.workplace_id,
        })
    }

    async fn find_request(&self, id: u64) -> Result<Option<PermissionRequest>, StoreError> {
        let request = sqlx::query_as::<_, PermissionRequest>(
            r#"
            SELECT id, worker_id, requested_date, submitted_date,
                   cause_id, permission_type_id, workplace_id
            FROM permission_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn update_request(&self, id: u64, fields: &PermissionFields) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock: approval inserts check this row through the foreign key
        // and wait until the update commits.
        let locked: Option<u64> =
            sqlx::query_scalar("SELECT id FROM permission_requests WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound);
        }

        let decisions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM approvals WHERE permission_request_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if decisions > 0 {
            return Err(StoreError::ConstraintViolation(format!(
                "permission request {id} already decided"
            )));
        }

        sqlx::query(
            r#"
            UPDATE permission_requests
            SET requested_date = ?, cause_id = ?, permission_type_id = ?, workplace_id = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.requested_date)
        .bind(fields.cause_id)
        .bind(fields.permission_type_id)
        .bind(fields.workplace_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_request(&self, id: u64) -> Result<(), StoreError> {
        // approvals go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM permission_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_requests(&self, worker_id: Option<u64>) -> Result<Vec<RequestRow>, StoreError> {
        let records = match worker_id {
            Some(worker_id) => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM permission_requests p {REQUEST_JOINS} \
                     WHERE p.worker_id = ? ORDER BY p.id"
                );
                sqlx::query_as::<_, RequestRecord>(&sql)
                    .bind(worker_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM permission_requests p {REQUEST_JOINS} ORDER BY p.id"
                );
                sqlx::query_as::<_, RequestRecord>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(records.into_iter().map(RequestRow::from).collect())
    }

    async fn approvals_for(&self, request_ids: &[u64]) -> Result<Vec<Approval>, StoreError> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; request_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, permission_request_id, manager_id, outcome, decided_date \
             FROM approvals WHERE permission_request_id IN ({placeholders}) ORDER BY id"
        );

        let mut query = sqlx::query_as::<_, ApprovalRecord>(&sql);
        for id in request_ids {
            query = query.bind(*id);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Approval::try_from)
            .collect()
    }

    async fn insert_approval(&self, approval: &NewApproval) -> Result<Approval, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO approvals (permission_request_id, manager_id, outcome, decided_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(approval.permission_request_id)
        .bind(approval.manager_id)
        .bind(approval.outcome.as_str())
        .bind(approval.decided_date)
        .execute(&self.pool)
        .await?;

        Ok(approval.with_id(result.last_insert_id()))
    }

    async fn delete_approval(&self, id: u64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM approvals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// `approvals.permission_request_id` carries a UNIQUE key.
    fn enforces_unique_decision(&self) -> bool {
        true
    }
}
