pub mod config;
pub mod migrate;
pub mod operations;
pub mod schema;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::migrate::{run_migrations, MigrationError};
use crate::models::{ARSessionStatus, Decimal, ValidationError};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file and applies pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbInitError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(DbInitError::Io)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(config.journal_mode.as_sqlx())
            .synchronous(config.synchronous.as_sqlx())
            .busy_timeout(config.busy_timeout)
            .foreign_keys(config.foreign_keys);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(path = %config.path.display(), "sqlite database opened");

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Wraps an already configured pool. Migrations are not run.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("check constraint violated: {0}")]
    CheckViolation(String),
    #[error("invalid AR session transition from {from} to {to}")]
    InvalidTransition {
        from: ARSessionStatus,
        to: ARSessionStatus,
    },
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let kind = err.as_database_error().map(|db_err| db_err.kind());
        match kind {
            Some(ErrorKind::UniqueViolation) => DbError::UniqueViolation(err.to_string()),
            Some(ErrorKind::ForeignKeyViolation) => DbError::ForeignKeyViolation(err.to_string()),
            Some(ErrorKind::CheckViolation) => DbError::CheckViolation(err.to_string()),
            _ => DbError::Sqlx(err),
        }
    }
}

impl DbError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }
}

pub(crate) fn decode_enum<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ValidationError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

pub(crate) fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    parse_decimal_column(column, &raw)
}

pub(crate) fn decode_opt_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| parse_decimal_column(column, &value)).transpose()
}

fn parse_decimal_column(column: &str, raw: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::parse(raw).map_err(|err| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

pub(crate) fn decode_json<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: DeserializeOwned,
{
    let Json(value) = row.try_get::<Json<T>, _>(column)?;
    Ok(value)
}

pub(crate) fn decode_opt_json<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: DeserializeOwned,
{
    let value: Option<Json<T>> = row.try_get(column)?;
    Ok(value.map(|Json(inner)| inner))
}
