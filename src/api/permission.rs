use crate::auth::auth::AuthUser;
use crate::model::permission_request::PermissionForm;
use crate::workflow::PermissionWorkflow;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/* =========================
Submit permission request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/permission",
    request_body(
        content = PermissionForm,
        description = "Requested day and its cause, type and workplace",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request submitted, pending review", body = PermissionRequest),
        (status = 400, description = "Missing field or unknown reference", body = Object, example = json!({
            "message": "cause_id: a selection is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only workers submit requests")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permission"
)]
pub async fn submit_permission(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    payload: web::Json<PermissionForm>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let request = workflow.submit(&actor, &payload).await?;
    Ok(HttpResponse::Created().json(request))
}

/* =========================
List own requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/permission",
    responses(
        (status = 200, description = "The caller's requests, latest requested date first", body = [PermissionView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permission"
)]
pub async fn list_my_permissions(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let views = workflow.list_for_worker(&actor).await?;
    Ok(HttpResponse::Ok().json(views))
}

/* =========================
Edit pending request
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/permission/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the permission request")
    ),
    request_body = PermissionForm,
    responses(
        (status = 200, description = "Request updated", body = PermissionRequest),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the owner of the request"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided", body = Object, example = json!({
            "message": "permission request 4 has already been decided and can no longer be edited"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permission"
)]
pub async fn edit_permission(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<PermissionForm>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let request = workflow.edit(&actor, path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Delete request
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/permission/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the permission request")
    ),
    responses(
        (status = 200, description = "Request deleted, or it no longer existed", body = Object, example = json!({
            "message": "Permission request deleted"
        })),
        (status = 403, description = "Not the owner of the request")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permission"
)]
pub async fn delete_permission(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    workflow.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Permission request deleted"
    })))
}
