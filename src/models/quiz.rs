//! Quiz Adventure: periods group levels, levels group ordered questions,
//! attempts collect per-question answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{QuestionDifficulty, QuestionType};
use crate::models::validation::{check_len, check_opt_len, check_positive, Validate, ValidationError};

pub const DEFAULT_MAX_ATTEMPTS: i64 = 3;
pub const DEFAULT_POINTS_VALUE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPeriod {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub display_order: i64,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizLevel {
    pub id: i64,
    pub historical_period_id: i64,
    pub level_number: i64,
    pub title: String,
    pub description: String,
    pub unlock_points_required: i64,
    pub completion_points_reward: i64,
    pub max_attempts: Option<i64>,
    pub time_limit_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_level_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: QuestionDifficulty,
    pub points_value: i64,
    pub explanation: String,
    pub media_url: Option<String>,
    pub correct_answer: String,
    pub answer_options: Option<Vec<String>>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub student_id: i64,
    pub quiz_level_id: i64,
    pub attempt_number: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub total_points_earned: i64,
    pub is_completed: bool,
    pub is_passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAnswer {
    pub id: i64,
    pub quiz_attempt_id: i64,
    pub question_id: i64,
    pub student_answer: String,
    pub is_correct: bool,
    pub points_earned: i64,
    pub answered_at: DateTime<Utc>,
    pub time_taken_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPeriodCreate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub start_year: Option<i64>,
    #[serde(default)]
    pub end_year: Option<i64>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub background_image: Option<String>,
}

impl Validate for HistoricalPeriodCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, 100)?;
        check_len("description", &self.description, 1000)?;
        check_opt_len("background_image", self.background_image.as_deref(), 500)?;
        Ok(())
    }
}

fn default_max_attempts() -> Option<i64> {
    Some(DEFAULT_MAX_ATTEMPTS)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizLevelCreate {
    pub level_number: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub unlock_points_required: i64,
    pub completion_points_reward: i64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<i64>,
    #[serde(default)]
    pub time_limit_minutes: Option<i64>,
}

impl Validate for QuizLevelCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_positive("level_number", self.level_number)?;
        check_len("title", &self.title, 200)?;
        check_len("description", &self.description, 500)?;
        check_positive("completion_points_reward", self.completion_points_reward)?;
        Ok(())
    }
}

fn default_points_value() -> i64 {
    DEFAULT_POINTS_VALUE
}

fn default_answer_options() -> Option<Vec<String>> {
    Some(Vec::new())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestionCreate {
    pub question_text: String,
    pub question_type: QuestionType,
    pub difficulty: QuestionDifficulty,
    #[serde(default = "default_points_value")]
    pub points_value: i64,
    pub explanation: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub correct_answer: String,
    #[serde(default = "default_answer_options")]
    pub answer_options: Option<Vec<String>>,
    #[serde(default)]
    pub display_order: i64,
}

impl Validate for QuizQuestionCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("question_text", &self.question_text, 1000)?;
        check_positive("points_value", self.points_value)?;
        check_len("explanation", &self.explanation, 1000)?;
        check_opt_len("media_url", self.media_url.as_deref(), 500)?;
        check_len("correct_answer", &self.correct_answer, 500)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizAttemptCreate {
    pub quiz_level_id: i64,
}

/// Totals and pass/fail are decided by scoring logic outside this crate and
/// stored as given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizAttemptCompletion {
    #[serde(default)]
    pub score: Option<i64>,
    pub total_points_earned: i64,
    pub is_passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnswerCreate {
    pub question_id: i64,
    pub student_answer: String,
}

impl Validate for StudentAnswerCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("student_answer", &self.student_answer, 1000)
    }
}

/// A submitted answer together with the externally judged outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnswerRecord {
    #[serde(flatten)]
    pub answer: StudentAnswerCreate,
    pub is_correct: bool,
    #[serde(default)]
    pub points_earned: i64,
    #[serde(default)]
    pub time_taken_seconds: Option<i64>,
}

impl Validate for StudentAnswerRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        self.answer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_defaults() {
        let level: QuizLevelCreate = serde_json::from_str(
            r#"{"level_number":1,"title":"Awal","description":"Level pertama","completion_points_reward":10}"#,
        )
        .unwrap();
        assert_eq!(level.max_attempts, Some(DEFAULT_MAX_ATTEMPTS));
        assert_eq!(level.unlock_points_required, 0);
        assert!(level.validate().is_ok());
    }

    #[test]
    fn test_level_number_must_be_positive() {
        let level = QuizLevelCreate {
            level_number: 0,
            title: "Awal".to_string(),
            description: String::new(),
            unlock_points_required: 0,
            completion_points_reward: 10,
            max_attempts: None,
            time_limit_minutes: None,
        };
        assert!(matches!(
            level.validate(),
            Err(ValidationError::NotPositive { field: "level_number", value: 0 })
        ));
    }

    #[test]
    fn test_question_defaults_and_enums() {
        let question: QuizQuestionCreate = serde_json::from_str(
            r#"{
                "question_text": "Siapa proklamator kemerdekaan?",
                "question_type": "short_answer",
                "difficulty": "easy",
                "explanation": "Soekarno dan Hatta",
                "correct_answer": "Soekarno-Hatta"
            }"#,
        )
        .unwrap();
        assert_eq!(question.points_value, DEFAULT_POINTS_VALUE);
        assert_eq!(question.answer_options, Some(vec![]));
        assert!(question.validate().is_ok());

        let bad = serde_json::from_str::<QuizQuestionCreate>(
            r#"{
                "question_text": "?",
                "question_type": "essay",
                "difficulty": "easy",
                "explanation": "",
                "correct_answer": ""
            }"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_answer_record_flattens_create_shape() {
        let record: StudentAnswerRecord = serde_json::from_str(
            r#"{"question_id":3,"student_answer":"1945","is_correct":true,"points_earned":10}"#,
        )
        .unwrap();
        assert_eq!(record.answer.question_id, 3);
        assert!(record.is_correct);
        assert_eq!(record.time_taken_seconds, None);
    }
}
