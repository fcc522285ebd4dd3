#![allow(dead_code)]

use tempfile::TempDir;

use sejarah_backend_rust::db::config::DbConfig;
use sejarah_backend_rust::db::operations::{
    create_historical_figure, create_historical_period, create_quiz_level, create_student_profile,
    create_teacher_profile, create_user,
};
use sejarah_backend_rust::db::Database;
use sejarah_backend_rust::models::{
    HistoricalFigure, HistoricalFigureCreate, HistoricalPeriod, HistoricalPeriodCreate, QuizLevel,
    QuizLevelCreate, StudentCreate, StudentGrade, StudentProfile, TeacherCreate, TeacherProfile,
    UserCreate,
};

/// A migrated database living inside its own temp directory.
pub struct TestDb {
    pub db: Database,
    pub dir: TempDir,
}

pub async fn create_test_db() -> TestDb {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = DbConfig::at_path(dir.path().join("test.db"));
    let db = Database::connect(&config).await.expect("failed to open database");
    TestDb { db, dir }
}

pub fn user_input(username: &str) -> UserCreate {
    UserCreate {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        full_name: format!("{username} full name"),
        is_teacher: false,
    }
}

pub async fn seed_student(db: &Database, username: &str) -> StudentProfile {
    let user = create_user(db, &user_input(username))
        .await
        .expect("failed to create user");
    create_student_profile(
        db,
        user.id,
        &StudentCreate {
            grade: StudentGrade::Grade5,
            school_name: "SDN 1".to_string(),
        },
    )
    .await
    .expect("failed to create student profile")
}

pub async fn seed_teacher(db: &Database, username: &str) -> TeacherProfile {
    let mut input = user_input(username);
    input.is_teacher = true;
    let user = create_user(db, &input).await.expect("failed to create user");
    create_teacher_profile(
        db,
        user.id,
        &TeacherCreate {
            school_name: "SDN 1".to_string(),
            certification_number: None,
            specialization: Some("Sejarah".to_string()),
        },
    )
    .await
    .expect("failed to create teacher profile")
}

pub async fn seed_period(db: &Database, name: &str) -> HistoricalPeriod {
    create_historical_period(
        db,
        &HistoricalPeriodCreate {
            name: name.to_string(),
            description: format!("{name} description"),
            start_year: None,
            end_year: None,
            display_order: 0,
            background_image: None,
        },
    )
    .await
    .expect("failed to create period")
}

pub fn level_input(level_number: i64) -> QuizLevelCreate {
    QuizLevelCreate {
        level_number,
        title: format!("Level {level_number}"),
        description: "Quiz level".to_string(),
        unlock_points_required: 0,
        completion_points_reward: 10,
        max_attempts: Some(3),
        time_limit_minutes: None,
    }
}

pub async fn seed_level(db: &Database, period_id: i64, level_number: i64) -> QuizLevel {
    create_quiz_level(db, period_id, &level_input(level_number))
        .await
        .expect("failed to create quiz level")
}

pub fn figure_input(name: &str) -> HistoricalFigureCreate {
    HistoricalFigureCreate {
        historical_period_id: None,
        name: name.to_string(),
        birth_year: None,
        death_year: None,
        birth_place: None,
        occupation: None,
        biography_summary: format!("{name} biography"),
        major_contributions: Vec::new(),
        famous_quotes: Vec::new(),
        portrait_url: None,
        is_featured: false,
        reading_level: StudentGrade::Grade5,
    }
}

pub async fn seed_figure(db: &Database, name: &str) -> HistoricalFigure {
    create_historical_figure(db, &figure_input(name))
        .await
        .expect("failed to create figure")
}
