use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::{decode_decimal, decode_enum, decode_json, decode_opt_json, Database, DbError};
use crate::models::{
    completion_percentage, Decimal, DiaryEntry, DiaryEntryCreate, FigureMultimedia,
    FigureMultimediaCreate, HeroDiaryProgress, HeroDiaryProgressUpdate, HistoricalFigure,
    HistoricalFigureCreate, TimelineEvent, TimelineEventCreate, Validate,
    COMPLETION_PERCENTAGE_PLACES,
};

fn map_historical_figure(row: &SqliteRow) -> Result<HistoricalFigure, sqlx::Error> {
    Ok(HistoricalFigure {
        id: row.try_get("id")?,
        historical_period_id: row.try_get("historical_period_id")?,
        name: row.try_get("name")?,
        birth_year: row.try_get("birth_year")?,
        death_year: row.try_get("death_year")?,
        birth_place: row.try_get("birth_place")?,
        occupation: row.try_get("occupation")?,
        biography_summary: row.try_get("biography_summary")?,
        major_contributions: decode_json(row, "major_contributions")?,
        famous_quotes: decode_json(row, "famous_quotes")?,
        portrait_url: row.try_get("portrait_url")?,
        is_featured: row.try_get("is_featured")?,
        reading_level: decode_enum(row, "reading_level")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_diary_entry(row: &SqliteRow) -> Result<DiaryEntry, sqlx::Error> {
    Ok(DiaryEntry {
        id: row.try_get("id")?,
        historical_figure_id: row.try_get("historical_figure_id")?,
        title: row.try_get("title")?,
        entry_text: row.try_get("entry_text")?,
        entry_date: row.try_get("entry_date")?,
        historical_context: row.try_get("historical_context")?,
        emotional_tone: row.try_get("emotional_tone")?,
        display_order: row.try_get("display_order")?,
        is_fictional: row.try_get("is_fictional")?,
        sources: decode_opt_json(row, "sources")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_timeline_event(row: &SqliteRow) -> Result<TimelineEvent, sqlx::Error> {
    Ok(TimelineEvent {
        id: row.try_get("id")?,
        historical_figure_id: row.try_get("historical_figure_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        event_date: row.try_get("event_date")?,
        event_year: row.try_get("event_year")?,
        importance_level: row.try_get("importance_level")?,
        location: row.try_get("location")?,
        display_order: row.try_get("display_order")?,
    })
}

fn map_figure_multimedia(row: &SqliteRow) -> Result<FigureMultimedia, sqlx::Error> {
    Ok(FigureMultimedia {
        id: row.try_get("id")?,
        historical_figure_id: row.try_get("historical_figure_id")?,
        media_type: decode_enum(row, "media_type")?,
        media_url: row.try_get("media_url")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        source_attribution: row.try_get("source_attribution")?,
        display_order: row.try_get("display_order")?,
        is_primary: row.try_get("is_primary")?,
    })
}

fn map_hero_diary_progress(row: &SqliteRow) -> Result<HeroDiaryProgress, sqlx::Error> {
    Ok(HeroDiaryProgress {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        historical_figure_id: row.try_get("historical_figure_id")?,
        entries_read: row.try_get("entries_read")?,
        total_entries: row.try_get("total_entries")?,
        completion_percentage: decode_decimal(row, "completion_percentage")?,
        last_accessed: row.try_get("last_accessed")?,
        favorite_entries: decode_json(row, "favorite_entries")?,
        notes: row.try_get("notes")?,
    })
}

const FIGURE_COLUMNS: &str = r#"
    id, historical_period_id, name, birth_year, death_year, birth_place, occupation,
    biography_summary, major_contributions, famous_quotes, portrait_url, is_featured,
    reading_level, created_at
"#;

const PROGRESS_COLUMNS: &str = r#"
    id, student_id, historical_figure_id, entries_read, total_entries,
    completion_percentage, last_accessed, favorite_entries, notes
"#;

pub async fn create_historical_figure(
    db: &Database,
    input: &HistoricalFigureCreate,
) -> Result<HistoricalFigure, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO historical_figures (
            historical_period_id, name, birth_year, death_year, birth_place, occupation,
            biography_summary, major_contributions, famous_quotes, portrait_url, is_featured,
            reading_level, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.historical_period_id)
    .bind(&input.name)
    .bind(input.birth_year)
    .bind(input.death_year)
    .bind(input.birth_place.as_deref())
    .bind(input.occupation.as_deref())
    .bind(&input.biography_summary)
    .bind(Json(&input.major_contributions))
    .bind(Json(&input.famous_quotes))
    .bind(input.portrait_url.as_deref())
    .bind(input.is_featured)
    .bind(input.reading_level.as_str())
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(figure_id = id, name = %input.name, "historical figure created");

    Ok(HistoricalFigure {
        id,
        historical_period_id: input.historical_period_id,
        name: input.name.clone(),
        birth_year: input.birth_year,
        death_year: input.death_year,
        birth_place: input.birth_place.clone(),
        occupation: input.occupation.clone(),
        biography_summary: input.biography_summary.clone(),
        major_contributions: input.major_contributions.clone(),
        famous_quotes: input.famous_quotes.clone(),
        portrait_url: input.portrait_url.clone(),
        is_featured: input.is_featured,
        reading_level: input.reading_level,
        created_at: now,
    })
}

pub async fn get_historical_figure(
    db: &Database,
    id: i64,
) -> Result<Option<HistoricalFigure>, DbError> {
    let sql = format!("SELECT {FIGURE_COLUMNS} FROM historical_figures WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_historical_figure).transpose()?)
}

pub async fn list_featured_figures(db: &Database) -> Result<Vec<HistoricalFigure>, DbError> {
    let sql = format!("SELECT {FIGURE_COLUMNS} FROM historical_figures WHERE is_featured = 1 ORDER BY name, id");
    let rows = sqlx::query(&sql).fetch_all(db.pool()).await?;

    Ok(rows.iter().map(map_historical_figure).collect::<Result<Vec<_>, _>>()?)
}

pub async fn list_figures_by_period(
    db: &Database,
    period_id: i64,
) -> Result<Vec<HistoricalFigure>, DbError> {
    let sql = format!(
        "SELECT {FIGURE_COLUMNS} FROM historical_figures WHERE historical_period_id = ? ORDER BY name, id"
    );
    let rows = sqlx::query(&sql)
        .bind(period_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_historical_figure).collect::<Result<Vec<_>, _>>()?)
}

pub async fn add_diary_entry(
    db: &Database,
    figure_id: i64,
    input: &DiaryEntryCreate,
) -> Result<DiaryEntry, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO diary_entries (
            historical_figure_id, title, entry_text, entry_date, historical_context,
            emotional_tone, display_order, is_fictional, sources, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(figure_id)
    .bind(&input.title)
    .bind(&input.entry_text)
    .bind(input.entry_date)
    .bind(&input.historical_context)
    .bind(input.emotional_tone.as_deref())
    .bind(input.display_order)
    .bind(input.is_fictional)
    .bind(input.sources.as_ref().map(Json))
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(entry_id = id, figure_id, "diary entry added");

    Ok(DiaryEntry {
        id,
        historical_figure_id: figure_id,
        title: input.title.clone(),
        entry_text: input.entry_text.clone(),
        entry_date: input.entry_date,
        historical_context: input.historical_context.clone(),
        emotional_tone: input.emotional_tone.clone(),
        display_order: input.display_order,
        is_fictional: input.is_fictional,
        sources: input.sources.clone(),
        created_at: now,
    })
}

pub async fn list_diary_entries(db: &Database, figure_id: i64) -> Result<Vec<DiaryEntry>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, historical_figure_id, title, entry_text, entry_date, historical_context,
               emotional_tone, display_order, is_fictional, sources, created_at
        FROM diary_entries
        WHERE historical_figure_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(figure_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_diary_entry).collect::<Result<Vec<_>, _>>()?)
}

pub async fn add_timeline_event(
    db: &Database,
    figure_id: i64,
    input: &TimelineEventCreate,
) -> Result<TimelineEvent, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO timeline_events (
            historical_figure_id, title, description, event_date, event_year,
            importance_level, location, display_order
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(figure_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.event_date)
    .bind(input.event_year)
    .bind(input.importance_level)
    .bind(input.location.as_deref())
    .bind(input.display_order)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(event_id = id, figure_id, importance = input.importance_level, "timeline event added");

    Ok(TimelineEvent {
        id,
        historical_figure_id: figure_id,
        title: input.title.clone(),
        description: input.description.clone(),
        event_date: input.event_date,
        event_year: input.event_year,
        importance_level: input.importance_level,
        location: input.location.clone(),
        display_order: input.display_order,
    })
}

pub async fn list_timeline_events(
    db: &Database,
    figure_id: i64,
) -> Result<Vec<TimelineEvent>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, historical_figure_id, title, description, event_date, event_year,
               importance_level, location, display_order
        FROM timeline_events
        WHERE historical_figure_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(figure_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_timeline_event).collect::<Result<Vec<_>, _>>()?)
}

pub async fn add_figure_multimedia(
    db: &Database,
    figure_id: i64,
    input: &FigureMultimediaCreate,
) -> Result<FigureMultimedia, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO figure_multimedia (
            historical_figure_id, media_type, media_url, title, description,
            source_attribution, display_order, is_primary
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(figure_id)
    .bind(input.media_type.as_str())
    .bind(&input.media_url)
    .bind(&input.title)
    .bind(input.description.as_deref())
    .bind(input.source_attribution.as_deref())
    .bind(input.display_order)
    .bind(input.is_primary)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(media_id = id, figure_id, media_type = %input.media_type, "figure multimedia added");

    Ok(FigureMultimedia {
        id,
        historical_figure_id: figure_id,
        media_type: input.media_type,
        media_url: input.media_url.clone(),
        title: input.title.clone(),
        description: input.description.clone(),
        source_attribution: input.source_attribution.clone(),
        display_order: input.display_order,
        is_primary: input.is_primary,
    })
}

pub async fn list_figure_multimedia(
    db: &Database,
    figure_id: i64,
) -> Result<Vec<FigureMultimedia>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, historical_figure_id, media_type, media_url, title, description,
               source_attribution, display_order, is_primary
        FROM figure_multimedia
        WHERE historical_figure_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(figure_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_figure_multimedia).collect::<Result<Vec<_>, _>>()?)
}

/// Returns the student's progress on a figure, creating it on first access
/// with `total_entries` set to the figure's current diary entry count.
///
/// Concurrent first calls insert one row between them and both get it back.
pub async fn start_hero_diary_progress(
    db: &Database,
    student_id: i64,
    figure_id: i64,
) -> Result<HeroDiaryProgress, DbError> {
    let percentage = Decimal::new(0, COMPLETION_PERCENTAGE_PLACES);
    let favorite_entries: Vec<i64> = Vec::new();

    let result = sqlx::query(
        r#"
        INSERT INTO hero_diary_progress (
            student_id, historical_figure_id, entries_read, total_entries,
            completion_percentage, last_accessed, favorite_entries, notes
        )
        VALUES (
            ?, ?, 0,
            (SELECT COUNT(*) FROM diary_entries WHERE historical_figure_id = ?),
            ?, ?, ?, NULL
        )
        ON CONFLICT (student_id, historical_figure_id) DO NOTHING
        "#,
    )
    .bind(student_id)
    .bind(figure_id)
    .bind(figure_id)
    .bind(percentage.to_string())
    .bind(Utc::now())
    .bind(Json(&favorite_entries))
    .execute(db.pool())
    .await?;

    let select = format!(
        "SELECT {PROGRESS_COLUMNS} FROM hero_diary_progress WHERE student_id = ? AND historical_figure_id = ?"
    );
    let rows = sqlx::query(&select)
        .bind(student_id)
        .bind(figure_id)
        .fetch_all(db.pool())
        .await?;
    let row = rows
        .first()
        .ok_or_else(|| DbError::not_found("hero diary progress for student", student_id))?;
    let progress = map_hero_diary_progress(row)?;

    if result.rows_affected() > 0 {
        tracing::info!(
            progress_id = progress.id,
            student_id,
            figure_id,
            total_entries = progress.total_entries,
            "hero diary progress started"
        );
    }

    Ok(progress)
}

pub async fn get_hero_diary_progress(
    db: &Database,
    student_id: i64,
    figure_id: i64,
) -> Result<Option<HeroDiaryProgress>, DbError> {
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM hero_diary_progress WHERE student_id = ? AND historical_figure_id = ?"
    );
    let row = sqlx::query(&sql)
        .bind(student_id)
        .bind(figure_id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_hero_diary_progress).transpose()?)
}

pub async fn list_hero_diary_progress(
    db: &Database,
    student_id: i64,
) -> Result<Vec<HeroDiaryProgress>, DbError> {
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM hero_diary_progress WHERE student_id = ? ORDER BY last_accessed DESC, id"
    );
    let rows = sqlx::query(&sql)
        .bind(student_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_hero_diary_progress).collect::<Result<Vec<_>, _>>()?)
}

/// Applies the present fields and refreshes `last_accessed`. A new
/// `entries_read` recomputes the completion percentage against
/// `total_entries`, which is fixed when the row is created.
pub async fn update_hero_diary_progress(
    db: &Database,
    progress_id: i64,
    input: &HeroDiaryProgressUpdate,
) -> Result<HeroDiaryProgress, DbError> {
    input.validate()?;

    let totals: Vec<i64> =
        sqlx::query_scalar(r#"SELECT total_entries FROM hero_diary_progress WHERE id = ?"#)
            .bind(progress_id)
            .fetch_all(db.pool())
            .await?;
    let total_entries = totals
        .into_iter()
        .next()
        .ok_or_else(|| DbError::not_found("hero diary progress", progress_id))?;

    let percentage = input
        .entries_read
        .and_then(|read| completion_percentage(read, total_entries));

    let update = format!(
        r#"
        UPDATE hero_diary_progress
        SET entries_read = COALESCE(?, entries_read),
            completion_percentage = COALESCE(?, completion_percentage),
            last_accessed = ?,
            favorite_entries = COALESCE(?, favorite_entries),
            notes = COALESCE(?, notes)
        WHERE id = ?
        RETURNING {PROGRESS_COLUMNS}
        "#
    );
    let rows = sqlx::query(&update)
        .bind(input.entries_read)
        .bind(percentage.map(|value| value.to_string()))
        .bind(Utc::now())
        .bind(input.favorite_entries.as_ref().map(Json))
        .bind(input.notes.as_deref())
        .bind(progress_id)
        .fetch_all(db.pool())
        .await?;

    let row = rows
        .first()
        .ok_or_else(|| DbError::not_found("hero diary progress", progress_id))?;
    let progress = map_hero_diary_progress(row)?;

    tracing::info!(
        progress_id,
        entries_read = progress.entries_read,
        completion = %progress.completion_percentage,
        "hero diary progress updated"
    );

    Ok(progress)
}
