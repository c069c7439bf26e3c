use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::filter::FieldPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub restrict_fields: bool,
    pub max_limit: Option<u64>,
}

impl FilterConfig {
    pub fn field_policy(&self) -> FieldPolicy {
        if self.restrict_fields {
            FieldPolicy::AllowList
        } else {
            FieldPolicy::Permissive
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub name: String,
    pub max_connections: u32,
    /// Seconds allowed to establish a pooled connection.
    pub connection_timeout: u64,
    /// Seconds allowed for a single storage operation.
    pub operation_timeout: u64,
}

impl DatabaseConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_hours: i64,
    pub refresh_token_days: i64,
    /// Require bearer tokens to match the pair stored on the user record.
    pub verify_session: bool,
    pub enable_cors: bool,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_hours", &self.access_token_hours)
            .field("refresh_token_days", &self.refresh_token_days)
            .field("verify_session", &self.verify_session)
            .field("enable_cors", &self.enable_cors)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("SECRETKEY must be set to a non-empty value")]
    MissingSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Database
        if let Some(v) = lookup("DB_URL").filter(|v| !v.is_empty()) {
            self.database.url = v;
        }
        if let Some(v) = lookup("DB_NAME").filter(|v| !v.is_empty()) {
            self.database.name = v;
        }
        if let Some(v) = lookup("STORAGE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "postgres" | "postgresql" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                _ => return Err(ConfigError::InvalidValue { name: "STORAGE_BACKEND", value: v }),
            };
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_OPERATION_TIMEOUT") {
            self.database.operation_timeout = parse_var("DATABASE_OPERATION_TIMEOUT", &v)?;
        }

        // Filter
        if let Some(v) = lookup("FILTER_RESTRICT_FIELDS") {
            self.filter.restrict_fields = parse_var("FILTER_RESTRICT_FIELDS", &v)?;
        }
        if let Some(v) = lookup("FILTER_MAX_LIMIT") {
            // 0 lifts the cap
            let max: u64 = parse_var("FILTER_MAX_LIMIT", &v)?;
            self.filter.max_limit = (max > 0).then_some(max);
        }

        // Security
        if let Some(v) = lookup("SECRETKEY") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_ACCESS_TOKEN_HOURS") {
            self.security.access_token_hours = parse_var("SECURITY_ACCESS_TOKEN_HOURS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_REFRESH_TOKEN_DAYS") {
            self.security.refresh_token_days = parse_var("SECURITY_REFRESH_TOKEN_DAYS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_VERIFY_SESSION") {
            self.security.verify_session = parse_var("SECURITY_VERIFY_SESSION", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_var("SECURITY_ENABLE_CORS", &v)?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            filter: FilterConfig {
                restrict_fields: true,
                max_limit: Some(200),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: "postgres://postgres@localhost:5432/".to_string(),
                name: "cctv_db".to_string(),
                max_connections: 10,
                connection_timeout: 60,
                operation_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_hours: 24,
                refresh_token_days: 7,
                verify_session: true,
                enable_cors: true,
            },
        }
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value: value.to_string() })
}
