use crate::auth::auth::AuthUser;
use crate::workflow::PermissionWorkflow;
use crate::workflow::filter::{ManagerFilter, ManagerFilterQuery};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/v1/report",
    params(ManagerFilterQuery),
    responses(
        (status = 200, description = "Filtered requests with counts per status", body = PermissionReport),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Managers only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn permission_report(
    auth: AuthUser,
    workflow: web::Data<PermissionWorkflow>,
    query: web::Query<ManagerFilterQuery>,
) -> actix_web::Result<impl Responder> {
    let actor = auth.actor()?;
    let filter = ManagerFilter::try_from(query.into_inner())?;
    let report = workflow.report(&actor, &filter).await?;
    Ok(HttpResponse::Ok().json(report))
}
