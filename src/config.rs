use anyhow::{Context, Result, anyhow};
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// Main HRM database, source of the employee roster
    pub database_url: String,
    /// Clocking device store; defaults to `database_url`
    pub attendance_database_url: String,
    pub jwt_secret: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        let database_url = required("DATABASE_URL")?;
        let attendance_database_url =
            lookup("ATTENDANCE_DATABASE_URL").unwrap_or_else(|| database_url.clone());

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url,
            attendance_database_url,
            jwt_secret: required("JWT_SECRET")?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has invalid value '{raw}'")),
        None => Ok(default),
    }
}
