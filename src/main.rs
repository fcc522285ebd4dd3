use std::process::ExitCode;

use tracing::Instrument;

use sejarah_backend_rust::config::Config;
use sejarah_backend_rust::db::operations::table_counts;
use sejarah_backend_rust::db::Database;
use sejarah_backend_rust::logging::init_tracing;
use sejarah_backend_rust::seed::seed_demo_catalogue;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log);

    let span = tracing::info_span!(
        "startup",
        db_path = %config.db.path.display(),
        seed_demo_data = config.seed_demo_data
    );
    run(config).instrument(span).await
}

async fn run(config: Config) -> ExitCode {
    let db = match Database::connect(&config.db).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "database not initialized");
            return ExitCode::FAILURE;
        }
    };

    if config.seed_demo_data {
        seed_demo_catalogue(&db).await;
    }

    match table_counts(&db).await {
        Ok(counts) => {
            for (table, rows) in counts {
                tracing::info!(table, rows, "table summary");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to count table rows"),
    }

    db.close().await;
    tracing::info!("database closed");
    ExitCode::SUCCESS
}
