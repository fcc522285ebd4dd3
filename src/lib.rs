pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod seed;

pub use db::{Database, DbError, DbInitError};
