use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::{
    decode_decimal, decode_enum, decode_json, decode_opt_decimal, decode_opt_json, Database,
    DbError,
};
use crate::models::{
    ARExperience, ARExperienceCreate, ARModel, ARModelCreate, ARSession, ARSessionCreate,
    ARSessionEnd, ARSessionStatus, ARTrigger, ARTriggerCreate, ARTriggerType, Validate,
};

fn map_ar_trigger(row: &SqliteRow) -> Result<ARTrigger, sqlx::Error> {
    Ok(ARTrigger {
        id: row.try_get("id")?,
        trigger_type: decode_enum(row, "trigger_type")?,
        trigger_name: row.try_get("trigger_name")?,
        description: row.try_get("description")?,
        recognition_data: decode_json(row, "recognition_data")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_ar_model(row: &SqliteRow) -> Result<ARModel, sqlx::Error> {
    Ok(ARModel {
        id: row.try_get("id")?,
        historical_figure_id: row.try_get("historical_figure_id")?,
        model_name: row.try_get("model_name")?,
        model_file_path: row.try_get("model_file_path")?,
        texture_file_path: row.try_get("texture_file_path")?,
        animation_file_path: row.try_get("animation_file_path")?,
        scale_factor: decode_decimal(row, "scale_factor")?,
        animation_triggers: decode_json(row, "animation_triggers")?,
        interaction_points: decode_json(row, "interaction_points")?,
        file_size_mb: decode_opt_decimal(row, "file_size_mb")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_ar_experience(row: &SqliteRow) -> Result<ARExperience, sqlx::Error> {
    Ok(ARExperience {
        id: row.try_get("id")?,
        ar_trigger_id: row.try_get("ar_trigger_id")?,
        ar_model_id: row.try_get("ar_model_id")?,
        experience_name: row.try_get("experience_name")?,
        description: row.try_get("description")?,
        interactive_elements: decode_json(row, "interactive_elements")?,
        storytelling_content: decode_json(row, "storytelling_content")?,
        audio_narration_url: row.try_get("audio_narration_url")?,
        duration_seconds: row.try_get("duration_seconds")?,
        grade_level: decode_enum(row, "grade_level")?,
        is_active: row.try_get("is_active")?,
    })
}

fn map_ar_session(row: &SqliteRow) -> Result<ARSession, sqlx::Error> {
    Ok(ARSession {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        ar_experience_id: row.try_get("ar_experience_id")?,
        session_start: row.try_get("session_start")?,
        session_end: row.try_get("session_end")?,
        duration_seconds: row.try_get("duration_seconds")?,
        interactions_count: row.try_get("interactions_count")?,
        completion_status: decode_enum(row, "completion_status")?,
        device_info: decode_opt_json(row, "device_info")?,
    })
}

const MODEL_COLUMNS: &str = r#"
    id, historical_figure_id, model_name, model_file_path, texture_file_path,
    animation_file_path, scale_factor, animation_triggers, interaction_points,
    file_size_mb, created_at
"#;

const EXPERIENCE_COLUMNS: &str = r#"
    id, ar_trigger_id, ar_model_id, experience_name, description, interactive_elements,
    storytelling_content, audio_narration_url, duration_seconds, grade_level, is_active
"#;

const SESSION_COLUMNS: &str = r#"
    id, student_id, ar_experience_id, session_start, session_end, duration_seconds,
    interactions_count, completion_status, device_info
"#;

pub async fn create_ar_trigger(db: &Database, input: &ARTriggerCreate) -> Result<ARTrigger, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO ar_triggers (trigger_type, trigger_name, description, recognition_data, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.trigger_type.as_str())
    .bind(&input.trigger_name)
    .bind(&input.description)
    .bind(Json(&input.recognition_data))
    .bind(input.is_active)
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(trigger_id = id, trigger_type = %input.trigger_type, "ar trigger created");

    Ok(ARTrigger {
        id,
        trigger_type: input.trigger_type,
        trigger_name: input.trigger_name.clone(),
        description: input.description.clone(),
        recognition_data: input.recognition_data.clone(),
        is_active: input.is_active,
        created_at: now,
    })
}

pub async fn get_ar_trigger(db: &Database, id: i64) -> Result<Option<ARTrigger>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, trigger_type, trigger_name, description, recognition_data, is_active, created_at
        FROM ar_triggers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_ar_trigger).transpose()?)
}

/// Active triggers, optionally narrowed to one trigger type.
pub async fn list_active_ar_triggers(
    db: &Database,
    trigger_type: Option<ARTriggerType>,
) -> Result<Vec<ARTrigger>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, trigger_type, trigger_name, description, recognition_data, is_active, created_at
        FROM ar_triggers
        WHERE is_active = 1 AND (? IS NULL OR trigger_type = ?)
        ORDER BY id
        "#,
    )
    .bind(trigger_type.map(ARTriggerType::as_str))
    .bind(trigger_type.map(ARTriggerType::as_str))
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_ar_trigger).collect::<Result<Vec<_>, _>>()?)
}

/// Decimal attributes are stored at exactly their declared scale.
pub async fn create_ar_model(db: &Database, input: &ARModelCreate) -> Result<ARModel, DbError> {
    input.validate()?;
    let (scale_factor, file_size_mb) = input.fixed_decimals()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO ar_models (
            historical_figure_id, model_name, model_file_path, texture_file_path,
            animation_file_path, scale_factor, animation_triggers, interaction_points,
            file_size_mb, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.historical_figure_id)
    .bind(&input.model_name)
    .bind(&input.model_file_path)
    .bind(input.texture_file_path.as_deref())
    .bind(input.animation_file_path.as_deref())
    .bind(scale_factor.to_string())
    .bind(Json(&input.animation_triggers))
    .bind(Json(&input.interaction_points))
    .bind(file_size_mb.map(|size| size.to_string()))
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(model_id = id, model_name = %input.model_name, "ar model created");

    Ok(ARModel {
        id,
        historical_figure_id: input.historical_figure_id,
        model_name: input.model_name.clone(),
        model_file_path: input.model_file_path.clone(),
        texture_file_path: input.texture_file_path.clone(),
        animation_file_path: input.animation_file_path.clone(),
        scale_factor,
        animation_triggers: input.animation_triggers.clone(),
        interaction_points: input.interaction_points.clone(),
        file_size_mb,
        created_at: now,
    })
}

pub async fn get_ar_model(db: &Database, id: i64) -> Result<Option<ARModel>, DbError> {
    let sql = format!("SELECT {MODEL_COLUMNS} FROM ar_models WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_ar_model).transpose()?)
}

pub async fn list_ar_models_for_figure(
    db: &Database,
    figure_id: i64,
) -> Result<Vec<ARModel>, DbError> {
    let sql = format!("SELECT {MODEL_COLUMNS} FROM ar_models WHERE historical_figure_id = ? ORDER BY id");
    let rows = sqlx::query(&sql)
        .bind(figure_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_ar_model).collect::<Result<Vec<_>, _>>()?)
}

pub async fn create_ar_experience(
    db: &Database,
    input: &ARExperienceCreate,
) -> Result<ARExperience, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO ar_experiences (
            ar_trigger_id, ar_model_id, experience_name, description, interactive_elements,
            storytelling_content, audio_narration_url, duration_seconds, grade_level, is_active
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.ar_trigger_id)
    .bind(input.ar_model_id)
    .bind(&input.experience_name)
    .bind(&input.description)
    .bind(Json(&input.interactive_elements))
    .bind(Json(&input.storytelling_content))
    .bind(input.audio_narration_url.as_deref())
    .bind(input.duration_seconds)
    .bind(input.grade_level.as_str())
    .bind(input.is_active)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(
        experience_id = id,
        trigger_id = input.ar_trigger_id,
        model_id = input.ar_model_id,
        "ar experience created"
    );

    Ok(ARExperience {
        id,
        ar_trigger_id: input.ar_trigger_id,
        ar_model_id: input.ar_model_id,
        experience_name: input.experience_name.clone(),
        description: input.description.clone(),
        interactive_elements: input.interactive_elements.clone(),
        storytelling_content: input.storytelling_content.clone(),
        audio_narration_url: input.audio_narration_url.clone(),
        duration_seconds: input.duration_seconds,
        grade_level: input.grade_level,
        is_active: input.is_active,
    })
}

pub async fn get_ar_experience(db: &Database, id: i64) -> Result<Option<ARExperience>, DbError> {
    let sql = format!("SELECT {EXPERIENCE_COLUMNS} FROM ar_experiences WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_ar_experience).transpose()?)
}

pub async fn list_active_experiences_for_trigger(
    db: &Database,
    trigger_id: i64,
) -> Result<Vec<ARExperience>, DbError> {
    let sql = format!(
        "SELECT {EXPERIENCE_COLUMNS} FROM ar_experiences WHERE ar_trigger_id = ? AND is_active = 1 ORDER BY id"
    );
    let rows = sqlx::query(&sql)
        .bind(trigger_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_ar_experience).collect::<Result<Vec<_>, _>>()?)
}

/// Opens a session in the `started` state. `student_id` is `None` for anonymous use.
pub async fn start_ar_session(
    db: &Database,
    student_id: Option<i64>,
    input: &ARSessionCreate,
) -> Result<ARSession, DbError> {
    let now = Utc::now();
    let status = ARSessionStatus::Started;
    let device_info = Some(input.device_info.clone().unwrap_or_default());

    let result = sqlx::query(
        r#"
        INSERT INTO ar_sessions (
            student_id, ar_experience_id, session_start, interactions_count,
            completion_status, device_info
        )
        VALUES (?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(input.ar_experience_id)
    .bind(now)
    .bind(status.as_str())
    .bind(device_info.as_ref().map(Json))
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!(
        session_id = id,
        student_id = ?student_id,
        experience_id = input.ar_experience_id,
        "ar session started"
    );

    Ok(ARSession {
        id,
        student_id,
        ar_experience_id: input.ar_experience_id,
        session_start: now,
        session_end: None,
        duration_seconds: None,
        interactions_count: 0,
        completion_status: status,
        device_info,
    })
}

pub async fn get_ar_session(db: &Database, id: i64) -> Result<Option<ARSession>, DbError> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM ar_sessions WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_ar_session).transpose()?)
}

/// Bumps the interaction counter and returns the new count.
pub async fn record_ar_interaction(db: &Database, session_id: i64) -> Result<i64, DbError> {
    // RETURNING statements are drained with fetch_all so sqlite resets them
    // and the write transaction ends before the connection goes back to the pool.
    let counts: Vec<i64> = sqlx::query_scalar(
        r#"
        UPDATE ar_sessions
        SET interactions_count = interactions_count + 1
        WHERE id = ?
        RETURNING interactions_count
        "#,
    )
    .bind(session_id)
    .fetch_all(db.pool())
    .await?;

    counts
        .into_iter()
        .next()
        .ok_or_else(|| DbError::not_found("ar session", session_id))
}

fn rejected_transition(session_id: i64, from: ARSessionStatus, to: ARSessionStatus) -> DbError {
    tracing::warn!(session_id, from = %from, to = %to, "rejected ar session transition");
    DbError::InvalidTransition { from, to }
}

async fn load_session(db: &Database, session_id: i64) -> Result<ARSession, DbError> {
    let select = format!("SELECT {SESSION_COLUMNS} FROM ar_sessions WHERE id = ?");
    let rows = sqlx::query(&select)
        .bind(session_id)
        .fetch_all(db.pool())
        .await?;

    match rows.first() {
        Some(row) => Ok(map_ar_session(row)?),
        None => Err(DbError::not_found("ar session", session_id)),
    }
}

/// Moves a `started` session to `completed` or `abandoned`, stamping the end
/// time and elapsed seconds.
///
/// The update is guarded on the status it was checked against, so when two
/// callers end the same session only one succeeds and the other gets
/// `InvalidTransition`.
pub async fn end_ar_session(
    db: &Database,
    session_id: i64,
    input: &ARSessionEnd,
) -> Result<ARSession, DbError> {
    input.validate()?;

    let session = load_session(db, session_id).await?;
    if !session.completion_status.can_transition_to(input.status) {
        return Err(rejected_transition(
            session_id,
            session.completion_status,
            input.status,
        ));
    }

    let now = Utc::now();
    let duration_seconds = (now - session.session_start).num_seconds().max(0);

    let update = format!(
        r#"
        UPDATE ar_sessions
        SET session_end = ?,
            duration_seconds = ?,
            interactions_count = COALESCE(?, interactions_count),
            completion_status = ?
        WHERE id = ? AND completion_status = ?
        RETURNING {SESSION_COLUMNS}
        "#
    );
    let rows = sqlx::query(&update)
        .bind(now)
        .bind(duration_seconds)
        .bind(input.interactions_count)
        .bind(input.status.as_str())
        .bind(session_id)
        .bind(session.completion_status.as_str())
        .fetch_all(db.pool())
        .await?;

    let Some(row) = rows.first() else {
        let current = load_session(db, session_id).await?;
        return Err(rejected_transition(
            session_id,
            current.completion_status,
            input.status,
        ));
    };
    let ended = map_ar_session(row)?;

    tracing::info!(
        session_id,
        status = %ended.completion_status,
        duration_seconds,
        interactions = ended.interactions_count,
        "ar session ended"
    );

    Ok(ended)
}
