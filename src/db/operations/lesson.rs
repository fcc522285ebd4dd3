use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::{decode_enum, decode_json, Database, DbError};
use crate::models::{
    ActivitySheet, ActivitySheetCreate, LessonPlan, LessonPlanCreate, TeachingMaterial,
    TeachingMaterialCreate, Validate,
};

fn map_lesson_plan(row: &SqliteRow) -> Result<LessonPlan, sqlx::Error> {
    Ok(LessonPlan {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        grade_level: decode_enum(row, "grade_level")?,
        subject: row.try_get("subject")?,
        duration_minutes: row.try_get("duration_minutes")?,
        learning_objectives: decode_json(row, "learning_objectives")?,
        curriculum_alignment: decode_json(row, "curriculum_alignment")?,
        gamification_elements: decode_json(row, "gamification_elements")?,
        created_by_id: row.try_get("created_by_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_validated: row.try_get("is_validated")?,
    })
}

fn map_teaching_material(row: &SqliteRow) -> Result<TeachingMaterial, sqlx::Error> {
    Ok(TeachingMaterial {
        id: row.try_get("id")?,
        lesson_plan_id: row.try_get("lesson_plan_id")?,
        title: row.try_get("title")?,
        material_type: decode_enum(row, "material_type")?,
        file_path: row.try_get("file_path")?,
        description: row.try_get("description")?,
        display_order: row.try_get("display_order")?,
        is_validated: row.try_get("is_validated")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_activity_sheet(row: &SqliteRow) -> Result<ActivitySheet, sqlx::Error> {
    Ok(ActivitySheet {
        id: row.try_get("id")?,
        lesson_plan_id: row.try_get("lesson_plan_id")?,
        title: row.try_get("title")?,
        instructions: row.try_get("instructions")?,
        activity_type: row.try_get("activity_type")?,
        estimated_time_minutes: row.try_get("estimated_time_minutes")?,
        materials_needed: decode_json(row, "materials_needed")?,
        assessment_criteria: decode_json(row, "assessment_criteria")?,
        file_path: row.try_get("file_path")?,
        created_at: row.try_get("created_at")?,
    })
}

const LESSON_PLAN_COLUMNS: &str = r#"
    id, title, description, grade_level, subject, duration_minutes,
    learning_objectives, curriculum_alignment, gamification_elements,
    created_by_id, created_at, updated_at, is_validated
"#;

/// New plans start unvalidated.
pub async fn create_lesson_plan(
    db: &Database,
    teacher_id: i64,
    input: &LessonPlanCreate,
) -> Result<LessonPlan, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO lesson_plans (
            title, description, grade_level, subject, duration_minutes,
            learning_objectives, curriculum_alignment, gamification_elements,
            created_by_id, created_at, updated_at, is_validated
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.grade_level.as_str())
    .bind(&input.subject)
    .bind(input.duration_minutes)
    .bind(Json(&input.learning_objectives))
    .bind(Json(&input.curriculum_alignment))
    .bind(Json(&input.gamification_elements))
    .bind(teacher_id)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(lesson_plan_id = id, teacher_id, "lesson plan created");

    Ok(LessonPlan {
        id,
        title: input.title.clone(),
        description: input.description.clone(),
        grade_level: input.grade_level,
        subject: input.subject.clone(),
        duration_minutes: input.duration_minutes,
        learning_objectives: input.learning_objectives.clone(),
        curriculum_alignment: input.curriculum_alignment.clone(),
        gamification_elements: input.gamification_elements.clone(),
        created_by_id: teacher_id,
        created_at: now,
        updated_at: now,
        is_validated: false,
    })
}

pub async fn get_lesson_plan(db: &Database, id: i64) -> Result<Option<LessonPlan>, DbError> {
    let sql = format!("SELECT {LESSON_PLAN_COLUMNS} FROM lesson_plans WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.as_ref().map(map_lesson_plan).transpose()?)
}

pub async fn list_lesson_plans_by_teacher(
    db: &Database,
    teacher_id: i64,
) -> Result<Vec<LessonPlan>, DbError> {
    let sql = format!(
        "SELECT {LESSON_PLAN_COLUMNS} FROM lesson_plans WHERE created_by_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query(&sql)
        .bind(teacher_id)
        .fetch_all(db.pool())
        .await?;

    Ok(rows.iter().map(map_lesson_plan).collect::<Result<Vec<_>, _>>()?)
}

pub async fn set_lesson_plan_validated(
    db: &Database,
    id: i64,
    validated: bool,
) -> Result<LessonPlan, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE lesson_plans
        SET is_validated = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(validated)
    .bind(Utc::now())
    .bind(id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("lesson plan", id));
    }
    tracing::info!(lesson_plan_id = id, validated, "lesson plan validation changed");

    get_lesson_plan(db, id)
        .await?
        .ok_or_else(|| DbError::not_found("lesson plan", id))
}

pub async fn add_teaching_material(
    db: &Database,
    lesson_plan_id: i64,
    input: &TeachingMaterialCreate,
) -> Result<TeachingMaterial, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO teaching_materials (
            lesson_plan_id, title, material_type, file_path, description,
            display_order, is_validated, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(lesson_plan_id)
    .bind(&input.title)
    .bind(input.material_type.as_str())
    .bind(&input.file_path)
    .bind(input.description.as_deref())
    .bind(input.display_order)
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(material_id = id, lesson_plan_id, "teaching material added");

    Ok(TeachingMaterial {
        id,
        lesson_plan_id,
        title: input.title.clone(),
        material_type: input.material_type,
        file_path: input.file_path.clone(),
        description: input.description.clone(),
        display_order: input.display_order,
        is_validated: false,
        created_at: now,
    })
}

pub async fn list_teaching_materials(
    db: &Database,
    lesson_plan_id: i64,
) -> Result<Vec<TeachingMaterial>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, lesson_plan_id, title, material_type, file_path, description,
               display_order, is_validated, created_at
        FROM teaching_materials
        WHERE lesson_plan_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(lesson_plan_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_teaching_material).collect::<Result<Vec<_>, _>>()?)
}

pub async fn set_teaching_material_validated(
    db: &Database,
    id: i64,
    validated: bool,
) -> Result<(), DbError> {
    let result = sqlx::query(r#"UPDATE teaching_materials SET is_validated = ? WHERE id = ?"#)
        .bind(validated)
        .bind(id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("teaching material", id));
    }
    tracing::info!(material_id = id, validated, "teaching material validation changed");
    Ok(())
}

pub async fn add_activity_sheet(
    db: &Database,
    lesson_plan_id: i64,
    input: &ActivitySheetCreate,
) -> Result<ActivitySheet, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO activity_sheets (
            lesson_plan_id, title, instructions, activity_type, estimated_time_minutes,
            materials_needed, assessment_criteria, file_path, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(lesson_plan_id)
    .bind(&input.title)
    .bind(&input.instructions)
    .bind(&input.activity_type)
    .bind(input.estimated_time_minutes)
    .bind(Json(&input.materials_needed))
    .bind(Json(&input.assessment_criteria))
    .bind(input.file_path.as_deref())
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(activity_sheet_id = id, lesson_plan_id, "activity sheet added");

    Ok(ActivitySheet {
        id,
        lesson_plan_id,
        title: input.title.clone(),
        instructions: input.instructions.clone(),
        activity_type: input.activity_type.clone(),
        estimated_time_minutes: input.estimated_time_minutes,
        materials_needed: input.materials_needed.clone(),
        assessment_criteria: input.assessment_criteria.clone(),
        file_path: input.file_path.clone(),
        created_at: now,
    })
}

pub async fn list_activity_sheets(
    db: &Database,
    lesson_plan_id: i64,
) -> Result<Vec<ActivitySheet>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, lesson_plan_id, title, instructions, activity_type, estimated_time_minutes,
               materials_needed, assessment_criteria, file_path, created_at
        FROM activity_sheets
        WHERE lesson_plan_id = ?
        ORDER BY id
        "#,
    )
    .bind(lesson_plan_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_activity_sheet).collect::<Result<Vec<_>, _>>()?)
}
