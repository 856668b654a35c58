use crate::auth::auth::AuthUser;
use crate::model::approval::DecisionPayload;
use crate::workflow::PermissionWorkflow;
use crate::workflow::filter::{ManagerFilter, ManagerFilterQuery};
use actix_web::{HttpResponse, Responder, web};

/// Requests awaiting or past review, filtered.
#[utoipa::path(
    get,
    path = "/api/v1/approval",
    params(ManagerFilterQuery),
    responses(
        (status = 200, description = "Matching requests with derived status", body = [PermissionView]),
        (status = 400, description = "Unknown status or inverted date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Managers only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Approval"
)]
pub async fn list_for_review(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    query: web::Query<ManagerFilterQuery>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let filter = ManagerFilter::try_from(query.into_inner())?;
    let views = workflow.list_for_manager(&actor, &filter).await?;
    Ok(HttpResponse::Ok().json(views))
}

/// Approves or rejects a pending request. Only the first decision counts.
#[utoipa::path(
    post,
    path = "/api/v1/approval/{request_id}",
    params(
        ("request_id" = u64, Path, description = "ID of the permission request to decide")
    ),
    request_body(
        content = DecisionPayload,
        description = "approved or rejected",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Decision recorded", body = Approval),
        (status = 403, description = "Managers only"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already resolved", body = Object, example = json!({
            "message": "permission request 4 was already resolved; the new decision was not recorded"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Approval"
)]
pub async fn decide(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    path: web::Path<u64>,
    payload: web::Json<DecisionPayload>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let approval = workflow
        .decide(&actor, path.into_inner(), payload.outcome)
        .await?;
    Ok(HttpResponse::Created().json(approval))
}
