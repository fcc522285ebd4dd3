use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{decode_enum, Database, DbError};
use crate::models::{
    TermConnection, TermConnectionCreate, Validate, VocabularyTerm, VocabularyTermCreate,
    VocabularyVisual, VocabularyVisualCreate,
};

fn map_vocabulary_term(row: &SqliteRow) -> Result<VocabularyTerm, sqlx::Error> {
    Ok(VocabularyTerm {
        id: row.try_get("id")?,
        historical_period_id: row.try_get("historical_period_id")?,
        term: row.try_get("term")?,
        definition: row.try_get("definition")?,
        pronunciation: row.try_get("pronunciation")?,
        audio_url: row.try_get("audio_url")?,
        etymology: row.try_get("etymology")?,
        usage_example: row.try_get("usage_example")?,
        difficulty_level: decode_enum(row, "difficulty_level")?,
        grade_level: decode_enum(row, "grade_level")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_vocabulary_visual(row: &SqliteRow) -> Result<VocabularyVisual, sqlx::Error> {
    Ok(VocabularyVisual {
        id: row.try_get("id")?,
        vocabulary_term_id: row.try_get("vocabulary_term_id")?,
        media_type: decode_enum(row, "media_type")?,
        media_url: row.try_get("media_url")?,
        caption: row.try_get("caption")?,
        alt_text: row.try_get("alt_text")?,
        display_order: row.try_get("display_order")?,
    })
}

fn map_term_connection(row: &SqliteRow) -> Result<TermConnection, sqlx::Error> {
    Ok(TermConnection {
        id: row.try_get("id")?,
        source_term_id: row.try_get("source_term_id")?,
        target_term_id: row.try_get("target_term_id")?,
        relationship_type: row.try_get("relationship_type")?,
        description: row.try_get("description")?,
        strength: row.try_get("strength")?,
    })
}

const TERM_COLUMNS: &str = r#"
    id, historical_period_id, term, definition, pronunciation, audio_url,
    etymology, usage_example, difficulty_level, grade_level, created_at
"#;

pub async fn create_vocabulary_term(
    db: &Database,
    input: &VocabularyTermCreate,
) -> Result<VocabularyTerm, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO vocabulary_terms (
            historical_period_id, term, definition, pronunciation, audio_url,
            etymology, usage_example, difficulty_level, grade_level, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.historical_period_id)
    .bind(&input.term)
    .bind(&input.definition)
    .bind(input.pronunciation.as_deref())
    .bind(input.audio_url.as_deref())
    .bind(input.etymology.as_deref())
    .bind(input.usage_example.as_deref())
    .bind(input.difficulty_level.as_str())
    .bind(input.grade_level.as_str())
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(term_id = id, term = %input.term, "vocabulary term created");

    Ok(VocabularyTerm {
        id,
        historical_period_id: input.historical_period_id,
        term: input.term.clone(),
        definition: input.definition.clone(),
        pronunciation: input.pronunciation.clone(),
        audio_url: input.audio_url.clone(),
        etymology: input.etymology.clone(),
        usage_example: input.usage_example.clone(),
        difficulty_level: input.difficulty_level,
        grade_level: input.grade_level,
        created_at: now,
    })
}

pub async fn get_vocabulary_term(db: &Database, id: i64) -> Result<Option<VocabularyTerm>, DbError> {
    let sql = format!("SELECT {TERM_COLUMNS} FROM vocabulary_terms WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_vocabulary_term).transpose()?)
}

/// Terms spelled `term`, ignoring ASCII case. Terms are not unique, so
/// several rows may match.
pub async fn find_vocabulary_terms(db: &Database, term: &str) -> Result<Vec<VocabularyTerm>, DbError> {
    let sql = format!(
        "SELECT {TERM_COLUMNS} FROM vocabulary_terms WHERE term = ? COLLATE NOCASE ORDER BY id"
    );
    let rows = sqlx::query(&sql)
        .bind(term)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_vocabulary_term).collect::<Result<Vec<_>, _>>()?)
}

pub async fn list_vocabulary_terms_by_period(
    db: &Database,
    period_id: i64,
) -> Result<Vec<VocabularyTerm>, DbError> {
    let sql = format!(
        "SELECT {TERM_COLUMNS} FROM vocabulary_terms WHERE historical_period_id = ? ORDER BY term COLLATE NOCASE, id"
    );
    let rows = sqlx::query(&sql)
        .bind(period_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_vocabulary_term).collect::<Result<Vec<_>, _>>()?)
}

pub async fn add_vocabulary_visual(
    db: &Database,
    term_id: i64,
    input: &VocabularyVisualCreate,
) -> Result<VocabularyVisual, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO vocabulary_visuals (vocabulary_term_id, media_type, media_url, caption, alt_text, display_order)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(term_id)
    .bind(input.media_type.as_str())
    .bind(&input.media_url)
    .bind(input.caption.as_deref())
    .bind(&input.alt_text)
    .bind(input.display_order)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(visual_id = id, term_id, media_type = %input.media_type, "vocabulary visual added");

    Ok(VocabularyVisual {
        id,
        vocabulary_term_id: term_id,
        media_type: input.media_type,
        media_url: input.media_url.clone(),
        caption: input.caption.clone(),
        alt_text: input.alt_text.clone(),
        display_order: input.display_order,
    })
}

pub async fn list_vocabulary_visuals(
    db: &Database,
    term_id: i64,
) -> Result<Vec<VocabularyVisual>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, vocabulary_term_id, media_type, media_url, caption, alt_text, display_order
        FROM vocabulary_visuals
        WHERE vocabulary_term_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(term_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_vocabulary_visual).collect::<Result<Vec<_>, _>>()?)
}

/// Adds a directed edge `source -> target`. A term may be connected to itself.
pub async fn connect_terms(
    db: &Database,
    input: &TermConnectionCreate,
) -> Result<TermConnection, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO term_connections (source_term_id, target_term_id, relationship_type, description, strength)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.source_term_id)
    .bind(input.target_term_id)
    .bind(&input.relationship_type)
    .bind(input.description.as_deref())
    .bind(input.strength)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(
        connection_id = id,
        source = input.source_term_id,
        target = input.target_term_id,
        relationship = %input.relationship_type,
        "terms connected"
    );

    Ok(TermConnection {
        id,
        source_term_id: input.source_term_id,
        target_term_id: input.target_term_id,
        relationship_type: input.relationship_type.clone(),
        description: input.description.clone(),
        strength: input.strength,
    })
}

pub async fn list_outgoing_connections(
    db: &Database,
    term_id: i64,
) -> Result<Vec<TermConnection>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, source_term_id, target_term_id, relationship_type, description, strength
        FROM term_connections
        WHERE source_term_id = ?
        ORDER BY strength DESC, id
        "#,
    )
    .bind(term_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_term_connection).collect::<Result<Vec<_>, _>>()?)
}

pub async fn list_incoming_connections(
    db: &Database,
    term_id: i64,
) -> Result<Vec<TermConnection>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, source_term_id, target_term_id, relationship_type, description, strength
        FROM term_connections
        WHERE target_term_id = ?
        ORDER BY strength DESC, id
        "#,
    )
    .bind(term_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_term_connection).collect::<Result<Vec<_>, _>>()?)
}
