use serde::{Deserialize, Serialize};

/// Bearer token claims issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// account email
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,

    /// Present only for accounts linked to a worker record
    #[serde(default)]
    pub worker_id: Option<u64>,
    /// Present only for manager accounts
    #[serde(default)]
    pub manager_id: Option<u64>,
}
