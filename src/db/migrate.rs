use sqlx::SqlitePool;

use crate::db::schema::{split_sql_statements, HERO_DIARY_PROGRESS_UNIQUE_SQL, INIT_SCHEMA_SQL};

/// Named migrations in application order.
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("001_init_schema", INIT_SCHEMA_SQL),
    ("002_hero_diary_progress_unique", HERO_DIARY_PROGRESS_UNIQUE_SQL),
];

pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, MigrationError> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> = sqlx::query_scalar(r#"SELECT name FROM _migrations ORDER BY id"#)
        .fetch_all(pool)
        .await?;

    let mut applied_count = 0;

    for (name, sql) in MIGRATIONS {
        if applied.iter().any(|done| done.as_str() == *name) {
            tracing::debug!(migration = *name, "Already applied, skipping");
            continue;
        }

        tracing::info!(migration = *name, "Applying migration...");

        let mut tx = pool.begin().await?;
        for statement in split_sql_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|source| MigrationError::Migration {
                    name: name.to_string(),
                    source,
                })?;
        }

        sqlx::query(r#"INSERT INTO _migrations (name, applied_at) VALUES (?, ?)"#)
            .bind(*name)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        applied_count += 1;
        tracing::info!(migration = *name, "Migration applied successfully");
    }

    if applied_count > 0 {
        tracing::info!(count = applied_count, "Database migrations completed");
    } else {
        tracing::info!("Database is up to date, no migrations needed");
    }

    Ok(applied_count)
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Migration '{name}' failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
