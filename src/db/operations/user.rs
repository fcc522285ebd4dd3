use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{decode_enum, Database, DbError};
use crate::models::{
    StudentCreate, StudentProfile, StudentProgressUpdate, TeacherCreate, TeacherProfile, User,
    UserCreate, UserUpdate, Validate,
};

fn map_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        is_teacher: row.try_get("is_teacher")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_student_profile(row: &SqliteRow) -> Result<StudentProfile, sqlx::Error> {
    Ok(StudentProfile {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        grade: decode_enum(row, "grade")?,
        school_name: row.try_get("school_name")?,
        total_points: row.try_get("total_points")?,
        current_level: row.try_get("current_level")?,
        streak_days: row.try_get("streak_days")?,
        last_activity: row.try_get("last_activity")?,
    })
}

fn map_teacher_profile(row: &SqliteRow) -> Result<TeacherProfile, sqlx::Error> {
    Ok(TeacherProfile {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        school_name: row.try_get("school_name")?,
        certification_number: row.try_get("certification_number")?,
        specialization: row.try_get("specialization")?,
    })
}

pub async fn create_user(db: &Database, input: &UserCreate) -> Result<User, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, full_name, is_teacher, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&input.full_name)
    .bind(input.is_teacher)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(user_id = id, username = %input.username, "user created");

    Ok(User {
        id,
        username: input.username.clone(),
        email: input.email.clone(),
        full_name: input.full_name.clone(),
        is_teacher: input.is_teacher,
        created_at: now,
        updated_at: now,
    })
}

pub async fn get_user(db: &Database, id: i64) -> Result<Option<User>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, full_name, is_teacher, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_user).transpose()?)
}

pub async fn get_user_by_username(db: &Database, username: &str) -> Result<Option<User>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, full_name, is_teacher, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_user).transpose()?)
}

/// Applies the present fields and refreshes `updated_at`.
pub async fn update_user(db: &Database, id: i64, input: &UserUpdate) -> Result<User, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET email = COALESCE(?, email),
            full_name = COALESCE(?, full_name),
            is_teacher = COALESCE(?, is_teacher),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(input.email.as_deref())
    .bind(input.full_name.as_deref())
    .bind(input.is_teacher)
    .bind(Utc::now())
    .bind(id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("user", id));
    }

    get_user(db, id)
        .await?
        .ok_or_else(|| DbError::not_found("user", id))
}

pub async fn create_student_profile(
    db: &Database,
    user_id: i64,
    input: &StudentCreate,
) -> Result<StudentProfile, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO student_profiles (user_id, grade, school_name)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(input.grade.as_str())
    .bind(&input.school_name)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(student_id = id, user_id, grade = %input.grade, "student profile created");

    Ok(StudentProfile {
        id,
        user_id,
        grade: input.grade,
        school_name: input.school_name.clone(),
        total_points: 0,
        current_level: 1,
        streak_days: 0,
        last_activity: None,
    })
}

pub async fn get_student_profile(db: &Database, id: i64) -> Result<Option<StudentProfile>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, grade, school_name, total_points, current_level, streak_days, last_activity
        FROM student_profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_student_profile).transpose()?)
}

pub async fn get_student_profile_by_user(
    db: &Database,
    user_id: i64,
) -> Result<Option<StudentProfile>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, grade, school_name, total_points, current_level, streak_days, last_activity
        FROM student_profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_student_profile).transpose()?)
}

/// Stores progress values computed by the caller. Absent fields are left unchanged.
pub async fn update_student_progress(
    db: &Database,
    student_id: i64,
    input: &StudentProgressUpdate,
) -> Result<StudentProfile, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE student_profiles
        SET total_points = COALESCE(?, total_points),
            current_level = COALESCE(?, current_level),
            streak_days = COALESCE(?, streak_days),
            last_activity = COALESCE(?, last_activity)
        WHERE id = ?
        "#,
    )
    .bind(input.total_points)
    .bind(input.current_level)
    .bind(input.streak_days)
    .bind(input.last_activity)
    .bind(student_id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("student profile", student_id));
    }

    tracing::info!(
        student_id,
        total_points = ?input.total_points,
        current_level = ?input.current_level,
        "student progress updated"
    );

    get_student_profile(db, student_id)
        .await?
        .ok_or_else(|| DbError::not_found("student profile", student_id))
}

pub async fn create_teacher_profile(
    db: &Database,
    user_id: i64,
    input: &TeacherCreate,
) -> Result<TeacherProfile, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO teacher_profiles (user_id, school_name, certification_number, specialization)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&input.school_name)
    .bind(input.certification_number.as_deref())
    .bind(input.specialization.as_deref())
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(teacher_id = id, user_id, "teacher profile created");

    Ok(TeacherProfile {
        id,
        user_id,
        school_name: input.school_name.clone(),
        certification_number: input.certification_number.clone(),
        specialization: input.specialization.clone(),
    })
}

pub async fn get_teacher_profile(db: &Database, id: i64) -> Result<Option<TeacherProfile>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, school_name, certification_number, specialization
        FROM teacher_profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_teacher_profile).transpose()?)
}

pub async fn get_teacher_profile_by_user(
    db: &Database,
    user_id: i64,
) -> Result<Option<TeacherProfile>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, school_name, certification_number, specialization
        FROM teacher_profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_teacher_profile).transpose()?)
}
