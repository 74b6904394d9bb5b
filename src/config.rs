//! Runtime configuration from environment variables (a `.env` file is honored by the binary).

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "data/structura.db";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            busy_timeout: Duration::from_millis(5000),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        if let Some(v) = lookup("DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.database_path = PathBuf::from(v.trim());
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            cfg.cors_origins = split_origins(&v);
        }
        match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(v) => cfg.jwt_secret = v,
            None => tracing::warn!("JWT_SECRET not set; using the built-in development secret"),
        }
        if let Some(v) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            cfg.host = v.trim().to_string();
        }
        if let Some(v) = lookup("PORT") {
            cfg.port = parse("PORT", &v)?;
        }
        if let Some(v) = lookup("DB_BUSY_TIMEOUT_MS") {
            cfg.busy_timeout = Duration::from_millis(parse("DB_BUSY_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            let n: u32 = parse("DB_MAX_CONNECTIONS", &v)?;
            if n == 0 {
                return Err(ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: v,
                });
            }
            cfg.max_connections = n;
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn split_origins(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
