use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

const CREATE_STUDENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        class TEXT NOT NULL,
        section TEXT NOT NULL,
        house TEXT NOT NULL,
        phone TEXT,
        notes TEXT,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )
"#;

/// Connection pool construction and schema setup for the Postgres store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured connection string
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool for: {}", Self::redact(&connection_string));
        Ok(pool)
    }

    fn connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        let base = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Strip the password from a connection string so it can be logged
    pub fn redact(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }

    /// Create the students and credentials tables if they do not exist.
    /// Failures are logged and swallowed; the tables may already be present
    /// under a role that cannot run DDL.
    pub async fn setup_schema(pool: &PgPool) {
        info!("Running database setup...");
        for (table, ddl) in [("students", CREATE_STUDENTS_TABLE), ("users", CREATE_USERS_TABLE)] {
            match sqlx::query(ddl).execute(pool).await {
                Ok(_) => info!("Ensured table exists: {}", table),
                Err(e) => warn!("Database setup error for table {}: {}", table, e),
            }
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
