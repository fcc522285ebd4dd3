pub mod ar;
pub mod badge;
pub mod hero_diary;
pub mod lesson;
pub mod quiz;
pub mod user;
pub mod vocabulary;

pub use ar::*;
pub use badge::*;
pub use hero_diary::*;
pub use lesson::*;
pub use quiz::*;
pub use user::*;
pub use vocabulary::*;

use crate::db::schema::TABLES;
use crate::db::{Database, DbError};

/// Row count for every schema table, in creation order.
pub async fn table_counts(db: &Database) -> Result<Vec<(&'static str, i64)>, DbError> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let sql = format!(r#"SELECT COUNT(*) FROM "{table}""#);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(db.pool()).await?;
        counts.push((*table, count));
    }
    Ok(counts)
}
