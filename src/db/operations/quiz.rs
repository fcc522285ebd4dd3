use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;

use crate::db::{decode_enum, decode_opt_json, Database, DbError};
use crate::models::{
    HistoricalPeriod, HistoricalPeriodCreate, QuizAttempt, QuizAttemptCompletion,
    QuizAttemptCreate, QuizLevel, QuizLevelCreate, QuizQuestion, QuizQuestionCreate,
    StudentAnswer, StudentAnswerRecord, Validate,
};

fn map_historical_period(row: &SqliteRow) -> Result<HistoricalPeriod, sqlx::Error> {
    Ok(HistoricalPeriod {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        start_year: row.try_get("start_year")?,
        end_year: row.try_get("end_year")?,
        display_order: row.try_get("display_order")?,
        background_image: row.try_get("background_image")?,
    })
}

fn map_quiz_level(row: &SqliteRow) -> Result<QuizLevel, sqlx::Error> {
    Ok(QuizLevel {
        id: row.try_get("id")?,
        historical_period_id: row.try_get("historical_period_id")?,
        level_number: row.try_get("level_number")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        unlock_points_required: row.try_get("unlock_points_required")?,
        completion_points_reward: row.try_get("completion_points_reward")?,
        max_attempts: row.try_get("max_attempts")?,
        time_limit_minutes: row.try_get("time_limit_minutes")?,
    })
}

fn map_quiz_question(row: &SqliteRow) -> Result<QuizQuestion, sqlx::Error> {
    Ok(QuizQuestion {
        id: row.try_get("id")?,
        quiz_level_id: row.try_get("quiz_level_id")?,
        question_text: row.try_get("question_text")?,
        question_type: decode_enum(row, "question_type")?,
        difficulty: decode_enum(row, "difficulty")?,
        points_value: row.try_get("points_value")?,
        explanation: row.try_get("explanation")?,
        media_url: row.try_get("media_url")?,
        correct_answer: row.try_get("correct_answer")?,
        answer_options: decode_opt_json(row, "answer_options")?,
        display_order: row.try_get("display_order")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_quiz_attempt(row: &SqliteRow) -> Result<QuizAttempt, sqlx::Error> {
    Ok(QuizAttempt {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        quiz_level_id: row.try_get("quiz_level_id")?,
        attempt_number: row.try_get("attempt_number")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        score: row.try_get("score")?,
        total_points_earned: row.try_get("total_points_earned")?,
        is_completed: row.try_get("is_completed")?,
        is_passed: row.try_get("is_passed")?,
    })
}

fn map_student_answer(row: &SqliteRow) -> Result<StudentAnswer, sqlx::Error> {
    Ok(StudentAnswer {
        id: row.try_get("id")?,
        quiz_attempt_id: row.try_get("quiz_attempt_id")?,
        question_id: row.try_get("question_id")?,
        student_answer: row.try_get("student_answer")?,
        is_correct: row.try_get("is_correct")?,
        points_earned: row.try_get("points_earned")?,
        answered_at: row.try_get("answered_at")?,
        time_taken_seconds: row.try_get("time_taken_seconds")?,
    })
}

pub async fn create_historical_period(
    db: &Database,
    input: &HistoricalPeriodCreate,
) -> Result<HistoricalPeriod, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO historical_periods (name, description, start_year, end_year, display_order, background_image)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.start_year)
    .bind(input.end_year)
    .bind(input.display_order)
    .bind(input.background_image.as_deref())
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(period_id = id, name = %input.name, "historical period created");

    Ok(HistoricalPeriod {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        start_year: input.start_year,
        end_year: input.end_year,
        display_order: input.display_order,
        background_image: input.background_image.clone(),
    })
}

pub async fn get_historical_period(
    db: &Database,
    id: i64,
) -> Result<Option<HistoricalPeriod>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, start_year, end_year, display_order, background_image
        FROM historical_periods
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_historical_period).transpose()?)
}

pub async fn get_historical_period_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<HistoricalPeriod>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, start_year, end_year, display_order, background_image
        FROM historical_periods
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_historical_period).transpose()?)
}

pub async fn list_historical_periods(db: &Database) -> Result<Vec<HistoricalPeriod>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, description, start_year, end_year, display_order, background_image
        FROM historical_periods
        ORDER BY display_order, id
        "#,
    )
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_historical_period).collect::<Result<Vec<_>, _>>()?)
}

pub async fn create_quiz_level(
    db: &Database,
    period_id: i64,
    input: &QuizLevelCreate,
) -> Result<QuizLevel, DbError> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO quiz_levels (
            historical_period_id, level_number, title, description,
            unlock_points_required, completion_points_reward, max_attempts, time_limit_minutes
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(period_id)
    .bind(input.level_number)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.unlock_points_required)
    .bind(input.completion_points_reward)
    .bind(input.max_attempts)
    .bind(input.time_limit_minutes)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(quiz_level_id = id, period_id, level_number = input.level_number, "quiz level created");

    Ok(QuizLevel {
        id,
        historical_period_id: period_id,
        level_number: input.level_number,
        title: input.title.clone(),
        description: input.description.clone(),
        unlock_points_required: input.unlock_points_required,
        completion_points_reward: input.completion_points_reward,
        max_attempts: input.max_attempts,
        time_limit_minutes: input.time_limit_minutes,
    })
}

pub async fn get_quiz_level(db: &Database, id: i64) -> Result<Option<QuizLevel>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, historical_period_id, level_number, title, description,
               unlock_points_required, completion_points_reward, max_attempts, time_limit_minutes
        FROM quiz_levels
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_quiz_level).transpose()?)
}

pub async fn list_quiz_levels(db: &Database, period_id: i64) -> Result<Vec<QuizLevel>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, historical_period_id, level_number, title, description,
               unlock_points_required, completion_points_reward, max_attempts, time_limit_minutes
        FROM quiz_levels
        WHERE historical_period_id = ?
        ORDER BY level_number, id
        "#,
    )
    .bind(period_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_quiz_level).collect::<Result<Vec<_>, _>>()?)
}

pub async fn create_quiz_question(
    db: &Database,
    quiz_level_id: i64,
    input: &QuizQuestionCreate,
) -> Result<QuizQuestion, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO quiz_questions (
            quiz_level_id, question_text, question_type, difficulty, points_value,
            explanation, media_url, correct_answer, answer_options, display_order, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(quiz_level_id)
    .bind(&input.question_text)
    .bind(input.question_type.as_str())
    .bind(input.difficulty.as_str())
    .bind(input.points_value)
    .bind(&input.explanation)
    .bind(input.media_url.as_deref())
    .bind(&input.correct_answer)
    .bind(input.answer_options.as_ref().map(Json))
    .bind(input.display_order)
    .bind(now)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(question_id = id, quiz_level_id, "quiz question created");

    Ok(QuizQuestion {
        id,
        quiz_level_id,
        question_text: input.question_text.clone(),
        question_type: input.question_type,
        difficulty: input.difficulty,
        points_value: input.points_value,
        explanation: input.explanation.clone(),
        media_url: input.media_url.clone(),
        correct_answer: input.correct_answer.clone(),
        answer_options: input.answer_options.clone(),
        display_order: input.display_order,
        created_at: now,
    })
}

pub async fn get_quiz_question(db: &Database, id: i64) -> Result<Option<QuizQuestion>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, quiz_level_id, question_text, question_type, difficulty, points_value,
               explanation, media_url, correct_answer, answer_options, display_order, created_at
        FROM quiz_questions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_quiz_question).transpose()?)
}

pub async fn list_quiz_questions(
    db: &Database,
    quiz_level_id: i64,
) -> Result<Vec<QuizQuestion>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, quiz_level_id, question_text, question_type, difficulty, points_value,
               explanation, media_url, correct_answer, answer_options, display_order, created_at
        FROM quiz_questions
        WHERE quiz_level_id = ?
        ORDER BY display_order, id
        "#,
    )
    .bind(quiz_level_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_quiz_question).collect::<Result<Vec<_>, _>>()?)
}

/// Opens a new attempt numbered one past the student's previous attempts on
/// the level. Numbering and insert happen in a single statement.
pub async fn start_quiz_attempt(
    db: &Database,
    student_id: i64,
    input: &QuizAttemptCreate,
) -> Result<QuizAttempt, DbError> {
    let now = Utc::now();
    let mut tx = db.pool().begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO quiz_attempts (
            student_id, quiz_level_id, attempt_number, started_at,
            score, total_points_earned, is_completed, is_passed
        )
        SELECT ?, ?, COALESCE(MAX(attempt_number), 0) + 1, ?, 0, 0, 0, 0
        FROM quiz_attempts
        WHERE student_id = ? AND quiz_level_id = ?
        "#,
    )
    .bind(student_id)
    .bind(input.quiz_level_id)
    .bind(now)
    .bind(student_id)
    .bind(input.quiz_level_id)
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();
    let attempt_number: i64 =
        sqlx::query_scalar(r#"SELECT attempt_number FROM quiz_attempts WHERE id = ?"#)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    tx.commit().await?;

    tracing::info!(
        attempt_id = id,
        student_id,
        quiz_level_id = input.quiz_level_id,
        attempt_number,
        "quiz attempt started"
    );

    Ok(QuizAttempt {
        id,
        student_id,
        quiz_level_id: input.quiz_level_id,
        attempt_number,
        started_at: now,
        completed_at: None,
        score: Some(0),
        total_points_earned: 0,
        is_completed: false,
        is_passed: false,
    })
}

pub async fn get_quiz_attempt(db: &Database, id: i64) -> Result<Option<QuizAttempt>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT id, student_id, quiz_level_id, attempt_number, started_at, completed_at,
               score, total_points_earned, is_completed, is_passed
        FROM quiz_attempts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.as_ref().map(map_quiz_attempt).transpose()?)
}

/// A student's attempts on one level, oldest first.
pub async fn list_quiz_attempts(
    db: &Database,
    student_id: i64,
    quiz_level_id: i64,
) -> Result<Vec<QuizAttempt>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, student_id, quiz_level_id, attempt_number, started_at, completed_at,
               score, total_points_earned, is_completed, is_passed
        FROM quiz_attempts
        WHERE student_id = ? AND quiz_level_id = ?
        ORDER BY attempt_number
        "#,
    )
    .bind(student_id)
    .bind(quiz_level_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_quiz_attempt).collect::<Result<Vec<_>, _>>()?)
}

/// Stores an answer with its externally judged outcome. The attempt's
/// totals are not touched.
pub async fn record_student_answer(
    db: &Database,
    attempt_id: i64,
    input: &StudentAnswerRecord,
) -> Result<StudentAnswer, DbError> {
    input.validate()?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO student_answers (
            quiz_attempt_id, question_id, student_answer, is_correct,
            points_earned, answered_at, time_taken_seconds
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(attempt_id)
    .bind(input.answer.question_id)
    .bind(&input.answer.student_answer)
    .bind(input.is_correct)
    .bind(input.points_earned)
    .bind(now)
    .bind(input.time_taken_seconds)
    .execute(db.pool())
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(
        answer_id = id,
        attempt_id,
        question_id = input.answer.question_id,
        is_correct = input.is_correct,
        "student answer recorded"
    );

    Ok(StudentAnswer {
        id,
        quiz_attempt_id: attempt_id,
        question_id: input.answer.question_id,
        student_answer: input.answer.student_answer.clone(),
        is_correct: input.is_correct,
        points_earned: input.points_earned,
        answered_at: now,
        time_taken_seconds: input.time_taken_seconds,
    })
}

pub async fn list_student_answers(
    db: &Database,
    attempt_id: i64,
) -> Result<Vec<StudentAnswer>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT id, quiz_attempt_id, question_id, student_answer, is_correct,
               points_earned, answered_at, time_taken_seconds
        FROM student_answers
        WHERE quiz_attempt_id = ?
        ORDER BY answered_at, id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_student_answer).collect::<Result<Vec<_>, _>>()?)
}

/// Closes an attempt with the caller's score and totals.
pub async fn complete_quiz_attempt(
    db: &Database,
    attempt_id: i64,
    input: &QuizAttemptCompletion,
) -> Result<QuizAttempt, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET completed_at = ?,
            score = ?,
            total_points_earned = ?,
            is_completed = 1,
            is_passed = ?
        WHERE id = ?
        "#,
    )
    .bind(Utc::now())
    .bind(input.score)
    .bind(input.total_points_earned)
    .bind(input.is_passed)
    .bind(attempt_id)
    .execute(db.pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("quiz attempt", attempt_id));
    }

    tracing::info!(
        attempt_id,
        total_points_earned = input.total_points_earned,
        is_passed = input.is_passed,
        "quiz attempt completed"
    );

    get_quiz_attempt(db, attempt_id)
        .await?
        .ok_or_else(|| DbError::not_found("quiz attempt", attempt_id))
}
