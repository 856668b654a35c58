use crate::auth::auth::AuthUser;
use crate::model::worker::{NewWorker, WorkerUpdate};
use crate::workers::WorkerRegistry;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/* =========================
Register worker (manager)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/worker",
    request_body(
        content = NewWorker,
        description = "Worker record; RUT body and check character are validated",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Worker registered, account awaiting email verification", body = Worker),
        (status = 400, description = "Invalid RUT, email, or already registered", body = Object, example = json!({
            "message": "dv: check character does not match the RUT"
        })),
        (status = 403, description = "Managers only"),
        (status = 502, description = "Identity service refused the account")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Worker"
)]
pub async fn create_worker(
    auth: AuthUser,
    registry: web::Data<WorkerRegistry>,
    payload: web::Json<NewWorker>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let worker = registry.register(&actor, &payload).await?;
    Ok(HttpResponse::Created().json(worker))
}

#[utoipa::path(
    get,
    path = "/api/v1/worker",
    responses(
        (status = 200, description = "All workers", body = [Worker]),
        (status = 403, description = "Managers only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Worker"
)]
pub async fn list_workers(
    auth: AuthUser,
    registry: web::Data<WorkerRegistry>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let workers = registry.list(&actor).await?;
    Ok(HttpResponse::Ok().json(workers))
}

#[utoipa::path(
    get,
    path = "/api/v1/worker/{worker_id}",
    params(
        ("worker_id" = u64, Path, description = "ID of the worker")
    ),
    responses(
        (status = 200, description = "Worker found", body = Worker),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Worker not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Worker"
)]
pub async fn get_worker(
    auth: AuthUser,
    registry: web::Data<WorkerRegistry>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let worker = registry.get(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(worker))
}

/* =========================
Update worker (partial)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/worker/{worker_id}",
    params(
        ("worker_id" = u64, Path, description = "ID of the worker")
    ),
    request_body(
        content = WorkerUpdate,
        description = "Only the fields to change",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Worker not found"),
        (status = 409, description = "Email linked to another account")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Worker"
)]
pub async fn update_worker(
    auth: AuthUser,
    registry: web::Data<WorkerRegistry>,
    path: web::Path<u64>,
    payload: web::Json<WorkerUpdate>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let worker = registry.update(&actor, path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(worker))
}

#[utoipa::path(
    delete,
    path = "/api/v1/worker/{worker_id}",
    params(
        ("worker_id" = u64, Path, description = "ID of the worker")
    ),
    responses(
        (status = 200, description = "Worker and their requests deleted", body = Object, example = json!({
            "message": "Worker deleted"
        })),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Worker not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Worker"
)]
pub async fn delete_worker(
    auth: AuthUser,
    registry: web::Data<WorkerRegistry>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    registry.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Worker deleted"
    })))
}
