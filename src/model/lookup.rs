use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Cause {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Trámite personal")]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PermissionType {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Día administrativo")]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Workplace {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Sede central")]
    pub name: String,
}

/// Options a worker picks from when filling in a request.
#[derive(Debug, Serialize, ToSchema)]
pub struct Lookups {
    pub causes: Vec<Cause>,
    pub permission_types: Vec<PermissionType>,
    pub workplaces: Vec<Workplace>,
}
