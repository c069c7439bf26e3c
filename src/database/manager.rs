use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, StorageBackend};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgDocumentStore;
use crate::database::store::{Collection, DocumentStore};
use crate::filter::FilterError;

/// Postgres error code for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Duplicate value for unique field '{0}'")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let field = db
                    .constraint()
                    .and_then(|c| c.split_once("__"))
                    .map(|(_, field)| field.to_string())
                    .unwrap_or_default();
                return DatabaseError::Duplicate(field);
            }
        }
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionError("connection pool timed out".to_string()),
            sqlx::Error::Io(e) => DatabaseError::ConnectionError(e.to_string()),
            other => DatabaseError::Sqlx(other),
        }
    }
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// Opens the configured document store.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::ensure_collections(&pool).await?;
                Ok(Arc::new(PgDocumentStore::new(pool, config.operation_timeout())))
            }
        }
    }

    /// Create the pool. Gives up after the configured connection timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if !Self::is_valid_db_name(&config.name) {
            return Err(DatabaseError::InvalidDatabaseName(config.name.clone()));
        }
        let connection_string = Self::build_connection_string(&config.url, &config.name)?;
        let timeout = config.connection_timeout();

        info!("Connecting to database '{}'", config.name);
        let connect = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(timeout)
            .connect(&connection_string);

        let pool = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| DatabaseError::Timeout(timeout))??;

        info!("Created database pool for: {}", config.name);
        Ok(pool)
    }

    /// Swap the database name into the path of the base URL.
    fn build_connection_string(base: &str, database_name: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }

    /// Create each collection table and its indexes if missing.
    pub async fn ensure_collections(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in Self::bootstrap_statements() {
            sqlx::query(&statement).execute(pool).await?;
        }
        info!("Collections ready: users, contacts, cctvs");
        Ok(())
    }

    fn bootstrap_statements() -> Vec<String> {
        let mut statements = Vec::new();
        for collection in Collection::ALL {
            let table = collection.name();
            statements.push(format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (id UUID PRIMARY KEY, doc JSONB NOT NULL)",
                table
            ));
            for field in collection.unique_fields() {
                statements.push(format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_{}__{}\" ON \"{}\" ((doc->>'{}'))",
                    table, field, table, field
                ));
            }
        }
        statements.push(
            "CREATE INDEX IF NOT EXISTS \"ix_cctvs__contact_id\" ON \"cctvs\" ((doc->>'contact_id'))".to_string(),
        );
        statements
    }

    fn is_valid_db_name(name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
