use crate::{
    api::{approval, lookup, permission, report, worker},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .with_context(|| format!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

/// Per-IP limiters shared by every worker thread.
#[derive(Clone)]
pub struct Limiters {
    protected: Limiter,
    decision: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            protected: build_limiter(config.rate_protected_per_min)?,
            decision: build_limiter(config.rate_decision_per_min)?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(limiters.protected.clone())
            .service(
                web::scope("/permission")
                    // /permission
                    .service(
                        web::resource("")
                            .route(web::get().to(permission::list_my_permissions))
                            .route(web::post().to(permission::submit_permission)),
                    )
                    // /permission/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(permission::edit_permission))
                            .route(web::delete().to(permission::delete_permission)),
                    ),
            )
            .service(
                web::scope("/approval")
                    .service(
                        web::resource("").route(web::get().to(approval::list_for_review)),
                    )
                    // /approval/{id}: one decision per request, tighter limit
                    .service(
                        web::resource("/{id}")
                            .wrap(limiters.decision.clone())
                            .route(web::post().to(approval::decide)),
                    ),
            )
            .service(web::resource("/report").route(web::get().to(report::permission_report)))
            .service(web::resource("/lookup").route(web::get().to(lookup::list_lookups)))
            .service(
                web::scope("/worker")
                    .service(
                        web::resource("")
                            .route(web::get().to(worker::list_workers))
                            .route(web::post().to(worker::create_worker)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(worker::get_worker))
                            .route(web::put().to(worker::update_worker))
                            .route(web::delete().to(worker::delete_worker)),
                    ),
            ),
    );
}
