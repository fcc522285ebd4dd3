use serde_json::json;

use crate::db::operations::{
    add_diary_entry, add_timeline_event, connect_terms, create_badge, create_historical_figure,
    create_historical_period, create_quiz_level, create_quiz_question, create_vocabulary_term,
    get_historical_period_by_name,
};
use crate::db::{Database, DbError};
use crate::models::{
    BadgeCreate, BadgeType, DiaryEntryCreate, HistoricalFigureCreate, HistoricalPeriodCreate,
    JsonObject, QuestionDifficulty, QuestionType, QuizLevelCreate, QuizQuestionCreate,
    StudentGrade, TermConnectionCreate, TimelineEventCreate, VocabularyTermCreate,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POINTS_VALUE,
};

pub const DEMO_PERIOD_NAME: &str = "Kerajaan Majapahit";

/// Inserts a small demo catalogue unless it is already present. Failures are
/// logged and swallowed.
pub async fn seed_demo_catalogue(db: &Database) {
    match insert_demo_catalogue(db).await {
        Ok(true) => tracing::info!(period = DEMO_PERIOD_NAME, "seeded demo catalogue"),
        Ok(false) => tracing::debug!(period = DEMO_PERIOD_NAME, "demo catalogue already exists"),
        Err(err) => tracing::warn!(error = %err, "failed to seed demo catalogue"),
    }
}

/// Returns `false` when the demo period already exists.
pub async fn insert_demo_catalogue(db: &Database) -> Result<bool, DbError> {
    if get_historical_period_by_name(db, DEMO_PERIOD_NAME).await?.is_some() {
        return Ok(false);
    }

    let period = create_historical_period(
        db,
        &HistoricalPeriodCreate {
            name: DEMO_PERIOD_NAME.to_string(),
            description: "Kerajaan Hindu-Buddha terbesar di Nusantara".to_string(),
            start_year: Some(1293),
            end_year: Some(1527),
            display_order: 1,
            background_image: None,
        },
    )
    .await?;

    let level = create_quiz_level(
        db,
        period.id,
        &QuizLevelCreate {
            level_number: 1,
            title: "Awal Majapahit".to_string(),
            description: "Berdirinya kerajaan dan tokoh-tokohnya".to_string(),
            unlock_points_required: 0,
            completion_points_reward: 50,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            time_limit_minutes: Some(10),
        },
    )
    .await?;

    create_quiz_question(
        db,
        level.id,
        &QuizQuestionCreate {
            question_text: "Siapa pendiri Kerajaan Majapahit?".to_string(),
            question_type: QuestionType::MultipleChoice,
            difficulty: QuestionDifficulty::Easy,
            points_value: DEFAULT_POINTS_VALUE,
            explanation: "Raden Wijaya mendirikan Majapahit pada tahun 1293.".to_string(),
            media_url: None,
            correct_answer: "Raden Wijaya".to_string(),
            answer_options: Some(vec![
                "Raden Wijaya".to_string(),
                "Hayam Wuruk".to_string(),
                "Gajah Mada".to_string(),
                "Ken Arok".to_string(),
            ]),
            display_order: 1,
        },
    )
    .await?;

    create_quiz_question(
        db,
        level.id,
        &QuizQuestionCreate {
            question_text: "Sumpah Palapa diucapkan oleh Gajah Mada.".to_string(),
            question_type: QuestionType::TrueFalse,
            difficulty: QuestionDifficulty::Medium,
            points_value: 20,
            explanation: "Gajah Mada bersumpah menyatukan Nusantara.".to_string(),
            media_url: None,
            correct_answer: "true".to_string(),
            answer_options: Some(vec!["true".to_string(), "false".to_string()]),
            display_order: 2,
        },
    )
    .await?;

    create_badge(
        db,
        &BadgeCreate {
            name: "Penjelajah Majapahit".to_string(),
            description: "Menyelesaikan level pertama Majapahit".to_string(),
            badge_type: BadgeType::LevelCompletion,
            icon_url: "/badges/majapahit.png".to_string(),
            criteria: json_object(json!({ "quiz_level_id": level.id })),
            points_reward: 25,
            is_active: true,
        },
    )
    .await?;

    create_badge(
        db,
        &BadgeCreate {
            name: "Nilai Sempurna".to_string(),
            description: "Menjawab semua soal dengan benar".to_string(),
            badge_type: BadgeType::PerfectScore,
            icon_url: "/badges/perfect.png".to_string(),
            criteria: json_object(json!({ "min_score": 100 })),
            points_reward: 50,
            is_active: true,
        },
    )
    .await?;

    let palapa = create_vocabulary_term(
        db,
        &VocabularyTermCreate {
            historical_period_id: Some(period.id),
            term: "Sumpah Palapa".to_string(),
            definition: "Sumpah Gajah Mada untuk menyatukan Nusantara".to_string(),
            pronunciation: Some("sum-pah pa-la-pa".to_string()),
            audio_url: None,
            etymology: None,
            usage_example: None,
            difficulty_level: QuestionDifficulty::Medium,
            grade_level: StudentGrade::Grade5,
        },
    )
    .await?;

    let mahapatih = create_vocabulary_term(
        db,
        &VocabularyTermCreate {
            historical_period_id: Some(period.id),
            term: "Mahapatih".to_string(),
            definition: "Jabatan perdana menteri di kerajaan Jawa".to_string(),
            pronunciation: None,
            audio_url: None,
            etymology: Some("Sanskerta: maha (besar) + patih".to_string()),
            usage_example: None,
            difficulty_level: QuestionDifficulty::Easy,
            grade_level: StudentGrade::Grade5,
        },
    )
    .await?;

    connect_terms(
        db,
        &TermConnectionCreate {
            source_term_id: palapa.id,
            target_term_id: mahapatih.id,
            relationship_type: "related_to".to_string(),
            description: Some("Diucapkan oleh seorang mahapatih".to_string()),
            strength: 4,
        },
    )
    .await?;

    let figure = create_historical_figure(
        db,
        &HistoricalFigureCreate {
            historical_period_id: Some(period.id),
            name: "Gajah Mada".to_string(),
            birth_year: Some(1290),
            death_year: Some(1364),
            birth_place: None,
            occupation: Some("Mahapatih".to_string()),
            biography_summary: "Mahapatih Majapahit yang terkenal dengan Sumpah Palapa".to_string(),
            major_contributions: vec!["Menyatukan Nusantara".to_string()],
            famous_quotes: vec!["Lamun huwus kalah Nusantara, isun amukti palapa".to_string()],
            portrait_url: None,
            is_featured: true,
            reading_level: StudentGrade::Grade5,
        },
    )
    .await?;

    add_diary_entry(
        db,
        figure.id,
        &DiaryEntryCreate {
            title: "Hari Aku Bersumpah".to_string(),
            entry_text: "Hari ini di hadapan raja aku bersumpah tidak akan beristirahat sebelum Nusantara bersatu.".to_string(),
            entry_date: None,
            historical_context: "Pengangkatan Gajah Mada sebagai mahapatih".to_string(),
            emotional_tone: Some("determined".to_string()),
            display_order: 1,
            is_fictional: true,
            sources: Some(vec!["Pararaton".to_string()]),
        },
    )
    .await?;

    add_timeline_event(
        db,
        figure.id,
        &TimelineEventCreate {
            title: "Sumpah Palapa".to_string(),
            description: "Gajah Mada mengucapkan Sumpah Palapa".to_string(),
            event_date: None,
            event_year: Some(1336),
            importance_level: 5,
            location: Some("Trowulan".to_string()),
            display_order: 1,
        },
    )
    .await?;

    Ok(true)
}

fn json_object(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
