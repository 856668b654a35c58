use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::{Lazy, OnceCell};
use sqlx::MySqlPool;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 86_400;

static TTL: OnceCell<Duration> = OnceCell::new();

/// Entries present are emails known to be TAKEN.
pub static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_live(*TTL.get_or_init(|| Duration::from_secs(DEFAULT_TTL_SECS)))
        .build()
});

/// Sets the entry lifetime. Only effective before the cache is first used.
pub fn configure(ttl: Duration) {
    if TTL.set(ttl).is_err() {
        log::warn!("Email cache TTL already set, ignoring {:?}", ttl);
    }
}

pub async fn mark_taken(email: &str) {
    EMAIL_CACHE.insert(email.trim().to_lowercase(), true).await;
}

pub async fn is_taken(email: &str) -> bool {
    EMAIL_CACHE
        .get(&email.trim().to_lowercase())
        .await
        .unwrap_or(false)
}

pub async fn forget(email: &str) {
    EMAIL_CACHE.invalidate(&email.trim().to_lowercase()).await;
}

async fn batch_mark(emails: &[String]) {
    let futures: Vec<_> = emails
        .iter()
        .map(|e| EMAIL_CACHE.insert(e.to_lowercase(), true))
        .collect();

    futures::future::join_all(futures).await;
}

/// Loads the emails of workers with recent requests, in batches.
pub async fn warmup_email_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT DISTINCT w.email
        FROM workers w
        JOIN permission_requests pr ON pr.worker_id = w.id
        WHERE pr.submitted_date >= CURDATE() - INTERVAL ? DAY
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (email,) = row?;
        batch.push(email);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Email cache warmup complete: {} active workers (last {} days)",
        total_count,
        days
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn marks_and_forgets() {
        assert!(!is_taken("cache.probe@school.cl").await);

        mark_taken("Cache.Probe@School.cl").await;
        assert!(is_taken("cache.probe@school.cl").await);

        forget("cache.probe@school.cl").await;
        assert!(!is_taken("cache.probe@school.cl").await);
    }
}
