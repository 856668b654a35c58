use async_trait::async_trait;
use sqlx::MySqlPool;

use super::store::WorkerStore;
use crate::error::StoreError;
use crate::model::worker::{NewWorker, Worker, WorkerUpdate};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};
use crate::utils::{email_cache, email_filter};

const WORKER_COLUMNS: &str =
    "id, rut, dv, given_name, paternal_surname, maternal_surname, email, job_title";

pub struct MySqlWorkerStore {
    pool: MySqlPool,
}

impl MySqlWorkerStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn changed_columns(changes: &WorkerUpdate) -> Vec<(&'static str, SqlValue)> {
    [
        ("rut", &changes.rut),
        ("dv", &changes.dv),
        ("given_name", &changes.given_name),
        ("paternal_surname", &changes.paternal_surname),
        ("maternal_surname", &changes.maternal_surname),
        ("email", &changes.email),
        ("job_title", &changes.job_title),
    ]
    .into_iter()
    .filter_map(|(column, value)| value.clone().map(|v| (column, SqlValue::String(v))))
    .collect()
}

#[async_trait]
impl WorkerStore for MySqlWorkerStore {
    async fn insert_worker(&self, worker: &NewWorker) -> Result<Worker, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO workers
                (rut, dv, given_name, paternal_surname, maternal_surname, email, job_title)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&worker.rut)
        .bind(&worker.dv)
        .bind(&worker.given_name)
        .bind(&worker.paternal_surname)
        .bind(&worker.maternal_surname)
        .bind(&worker.email)
        .bind(&worker.job_title)
        .execute(&self.pool)
        .await?;

        email_filter::insert(&worker.email);
        email_cache::mark_taken(&worker.email).await;

        Ok(worker.clone().with_id(result.last_insert_id()))
    }

    async fn find_worker(&self, id: u64) -> Result<Option<Worker>, StoreError> {
        let worker = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    async fn update_worker(
        &self,
        current: &Worker,
        changes: &WorkerUpdate,
    ) -> Result<(), StoreError> {
        let Some(update) = build_update_sql("workers", changed_columns(changes), "id", current.id)
        else {
            return Ok(());
        };

        let affected = execute_update(&self.pool, update).await?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        if let Some(email) = &changes.email {
            email_filter::remove(&current.email);
            email_cache::forget(&current.email).await;
            email_filter::insert(email);
            email_cache::mark_taken(email).await;
        }
        Ok(())
    }

    async fn delete_worker(&self, worker: &Worker) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM workers WHERE id = ?")
            .bind(worker.id)
            .execute(&self.pool)
            .await?;

        email_filter::remove(&worker.email);
        email_cache::forget(&worker.email).await;
        Ok(())
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        let workers = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers ORDER BY paternal_surname, given_name, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(workers)
    }

    /// Cuckoo filter for a fast "free", moka cache for a fast "taken", and
    /// the database for everything else.
    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let email = email.trim().to_lowercase();

        if !email_filter::might_exist(&email) {
            return Ok(false);
        }

        if email_cache::is_taken(&email).await {
            return Ok(true);
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workers WHERE email = ?")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;

        let exists = count > 0;
        if exists {
            email_cache::mark_taken(&email).await;
        }
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changed_fields_become_columns() {
        let changes = WorkerUpdate {
            email: Some("ana@school.cl".to_string()),
            job_title: Some("Inspector".to_string()),
            ..Default::default()
        };

        let columns: Vec<_> = changed_columns(&changes).into_iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["email", "job_title"]);
        assert!(changed_columns(&WorkerUpdate::default()).is_empty());
    }
}
