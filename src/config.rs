use std::path::PathBuf;

use crate::db::config::{env_bool, DbConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub seed_demo_data: bool,
    pub db: DbConfig,
}

/// Where and how verbosely the process logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `RUST_LOG` directive. A bare level applies to this crate and keeps sqlx at `warn`.
    pub level: String,
    pub file_logs: bool,
    pub dir: PathBuf,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            file_logs: env_bool("ENABLE_FILE_LOGS", false),
            dir: std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs")),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log: LogConfig::from_env(),
            seed_demo_data: env_bool("SEED_DEMO_DATA", false),
            db: DbConfig::from_env(),
        }
    }
}
