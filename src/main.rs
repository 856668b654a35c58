use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod utils;
mod workers;
mod workflow;

use config::Config;
use db::init_db;

use crate::auth::identity::SqlIdentityDirectory;
use crate::docs::ApiDoc;
use crate::routes::Limiters;
use crate::utils::{email_cache, email_filter};
use crate::workers::WorkerRegistry;
use crate::workers::mysql::MySqlWorkerStore;
use crate::workflow::PermissionWorkflow;
use crate::workflow::mysql::MySqlPermissionStore;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "permisos.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, prefix = %config.api_prefix, "Server starting...");

    email_cache::configure(Duration::from_secs(config.email_cache_ttl_secs));
    let pool = init_db(&config.database_url).await?;
    let limiters = Limiters::from_config(&config)?;

    let workflow = Data::new(PermissionWorkflow::new(Arc::new(MySqlPermissionStore::new(
        pool.clone(),
    ))));
    let registry = Data::new(WorkerRegistry::new(
        Arc::new(MySqlWorkerStore::new(pool.clone())),
        Arc::new(SqlIdentityDirectory::new(pool.clone())),
    ));

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();
    let server_addr = config.server_addr.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = email_filter::warmup_email_filter(&pool_for_filter_warmup, 100).await {
            log::error!("Failed to warmup email filter: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        // Workers with requests in the last 30 days, batches of 250
        if let Err(e) = email_cache::warmup_email_cache(&pool_for_cache_warmup, 30, 250).await {
            log::error!("Failed to warmup email cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard so the UI's JS/CSS assets resolve
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(workflow.clone())
            .app_data(registry.clone())
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
