use crate::auth::auth::AuthUser;
use crate::model::lookup::{Cause, Lookups, PermissionType, Workplace};
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;

/// Causes, permission types and workplaces a request can reference.
#[utoipa::path(
    get,
    path = "/api/v1/lookup",
    responses(
        (status = 200, description = "Selectable options", body = Lookups),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Lookup"
)]
pub async fn list_lookups(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let internal = |e: sqlx::Error| {
        tracing::error!(error = %e, "Failed to load lookups");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    };

    let causes = sqlx::query_as::<_, Cause>("SELECT id, description FROM causes ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(internal)?;

    let permission_types = sqlx::query_as::<_, PermissionType>(
        "SELECT id, description FROM permission_types ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    let workplaces = sqlx::query_as::<_, Workplace>("SELECT id, name FROM workplaces ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(internal)?;

    Ok(HttpResponse::Ok().json(Lookups {
        causes,
        permission_types,
        workplaces,
    }))
}
