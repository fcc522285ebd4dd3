use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::{decode_enum, decode_json, decode_opt_json, Database, DbError};
use crate::models::{Badge, BadgeCreate, JsonObject, StudentBadge, Validate};

fn map_badge(row: &SqliteRow) -> Result<Badge, sqlx::Error> {
    Ok(Badge {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        badge_type: decode_enum(row, "badge_type")?,
        icon_url: row.try_get("icon_url")?,
        criteria: decode_json(row, "criteria")?,
        points_reward: row.try_get("points_reward")?,
        is_active: row.try_get("is_active")?,
    })
}

fn map_student_badge(row: &SqliteRow) -> Result<StudentBadge, sqlx::Error> {
    Ok(StudentBadge {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        badge_id: row.try_get("badge_id")?,
        earned_at: row.try_get("earned_at")?,
        progress_data: decode_opt_json(row, "progress_data")?,
    })
}

pub async fn create_badge(db: &Database, input: &BadgeCreate) -> Result<Badge, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO badges (name, description, badge_type, icon_url, criteria, points_reward, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.badge_type.as_str())
    .bind(&input.icon_url)
    .bind(Json(&input.criteria))
    .bind(input.points_reward)
    .bind(input.is_active)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(badge_id = id, name = %input.name, badge_type = %input.badge_type, "badge created");

    Ok(Badge {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        badge_type: input.badge_type,
        icon_url: input.icon_url.clone(),
        criteria: input.criteria.clone(),
        points_reward: input.points_reward,
        is_active: input.is_active,
    })
}

pub async fn get_badge(db: &Database, id: i64) -> Result<Option<Badge>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, badge_type, icon_url, criteria, points_reward, is_active
        FROM badges
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_badge).transpose()?)
}

pub async fn list_active_badges(db: &Database) -> Result<Vec<Badge>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, badge_type, icon_url, criteria, points_reward, is_active
        FROM badges
        WHERE is_active = 1
        ORDER BY id
        "#,
    )
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_badge).collect::<Result<Vec<_>, _>>()?)
}

/// Records that a student earned a badge. Award criteria are checked by the caller.
pub async fn award_badge(
    db: &Database,
    student_id: i64,
    badge_id: i64,
    progress_data: Option<JsonObject>,
) -> Result<StudentBadge, DbError> {
    let now = Utc::now();
    let progress_data = Some(progress_data.unwrap_or_default());

    let result = sqlx::query(
        r#"
        INSERT INTO student_badges (student_id, badge_id, earned_at, progress_data)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(badge_id)
    .bind(now)
    .bind(progress_data.as_ref().map(Json))
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(student_badge_id = id, student_id, badge_id, "badge awarded");

    Ok(StudentBadge {
        id,
        student_id,
        badge_id,
        earned_at: now,
        progress_data,
    })
}

pub async fn list_student_badges(
    db: &Database,
    student_id: i64,
) -> Result<Vec<StudentBadge>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, student_id, badge_id, earned_at, progress_data
        FROM student_badges
        WHERE student_id = ?
        ORDER BY earned_at, id
        "#,
    )
    .bind(student_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_student_badge).collect::<Result<Vec<_>, _>>()?)
}
