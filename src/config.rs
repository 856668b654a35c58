use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_decision_per_min: u32,

    pub email_cache_ttl_secs: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: or_default("API_PREFIX", "/api/v1".to_string())?,

            log_dir: or_default("LOG_DIR", "logs".to_string())?,
            log_level: or_default("LOG_LEVEL", "info".to_string())?,

            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_decision_per_min: or_default("RATE_DECISION_PER_MIN", 60)?,

            email_cache_ttl_secs: or_default("EMAIL_CACHE_TTL_SECS", 86_400)?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/permisos_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api/v1".to_string(),
            log_dir: "logs".to_string(),
            log_level: "debug".to_string(),
            rate_protected_per_min: 1000,
            rate_decision_per_min: 60,
            email_cache_ttl_secs: 60,
        }
    }
}
