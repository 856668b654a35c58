use crate::model::approval::{Approval, DecisionPayload, Outcome};
use crate::model::lookup::{Cause, Lookups, PermissionType, Workplace};
use crate::model::permission_request::{
    PermissionForm, PermissionRequest, PermissionStatus, PermissionView, RequestLabels,
    WorkerSummary,
};
use crate::model::worker::{NewWorker, Worker, WorkerUpdate};
use crate::workflow::filter::ManagerFilterQuery;
use crate::workflow::report::PermissionReport;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Permisos API",
        version = "1.0.0",
        description = r#"
## Staff Permission Requests

Workers request a day of permission; managers approve or reject it once.

### Key Features
- **Permission requests**
  - Submit, edit and delete your own requests while they are pending
- **Approvals**
  - Review requests filtered by status, RUT or date range, and record one decision per request
- **Reports**
  - Filtered listings with counts per status
- **Workers**
  - Register and maintain worker records with validated RUTs

### Security
Every endpoint requires a **JWT Bearer** token issued by the identity service.
"#,
    ),
    paths(
        crate::api::permission::submit_permission,
        crate::api::permission::list_my_permissions,
        crate::api::permission::edit_permission,
        crate::api::permission::delete_permission,

        crate::api::approval::list_for_review,
        crate::api::approval::decide,

        crate::api::report::permission_report,

        crate::api::worker::create_worker,
        crate::api::worker::list_workers,
        crate::api::worker::get_worker,
        crate::api::worker::update_worker,
        crate::api::worker::delete_worker,

        crate::api::lookup::list_lookups
    ),
    components(
        schemas(
            PermissionForm,
            PermissionRequest,
            PermissionStatus,
            PermissionView,
            WorkerSummary,
            RequestLabels,
            Approval,
            Outcome,
            DecisionPayload,
            ManagerFilterQuery,
            PermissionReport,
            Worker,
            NewWorker,
            WorkerUpdate,
            Cause,
            PermissionType,
            Workplace,
            Lookups
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Permission", description = "Worker permission requests"),
        (name = "Approval", description = "Manager review and decisions"),
        (name = "Report", description = "Filtered request reports"),
        (name = "Worker", description = "Worker records"),
        (name = "Lookup", description = "Causes, permission types and workplaces"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/permission",
            "/api/v1/permission/{request_id}",
            "/api/v1/approval",
            "/api/v1/approval/{request_id}",
            "/api/v1/report",
            "/api/v1/worker",
            "/api/v1/worker/{worker_id}",
            "/api/v1/lookup",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
