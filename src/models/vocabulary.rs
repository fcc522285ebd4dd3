//! Vocabulary Explorer: terms, their visuals, and a directed graph of
//! typed, weighted connections between terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{MediaType, QuestionDifficulty, StudentGrade};
use crate::models::validation::{check_len, check_opt_len, check_range, Validate, ValidationError};

pub const MIN_CONNECTION_STRENGTH: i64 = 1;
pub const MAX_CONNECTION_STRENGTH: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub id: i64,
    pub historical_period_id: Option<i64>,
    pub term: String,
    pub definition: String,
    pub pronunciation: Option<String>,
    pub audio_url: Option<String>,
    pub etymology: Option<String>,
    pub usage_example: Option<String>,
    pub difficulty_level: QuestionDifficulty,
    pub grade_level: StudentGrade,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyVisual {
    pub id: i64,
    pub vocabulary_term_id: i64,
    pub media_type: MediaType,
    pub media_url: String,
    pub caption: Option<String>,
    pub alt_text: String,
    pub display_order: i64,
}

/// Directed edge `source_term_id -> target_term_id`. Terms never hold each
/// other; the graph is only ever walked through these rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermConnection {
    pub id: i64,
    pub source_term_id: i64,
    pub target_term_id: i64,
    /// e.g. `synonym`, `antonym`, `related_to`, `part_of`.
    pub relationship_type: String,
    pub description: Option<String>,
    pub strength: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyTermCreate {
    #[serde(default)]
    pub historical_period_id: Option<i64>,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub etymology: Option<String>,
    #[serde(default)]
    pub usage_example: Option<String>,
    pub difficulty_level: QuestionDifficulty,
    pub grade_level: StudentGrade,
}

impl Validate for VocabularyTermCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("term", &self.term, 100)?;
        check_len("definition", &self.definition, 2000)?;
        check_opt_len("pronunciation", self.pronunciation.as_deref(), 200)?;
        check_opt_len("audio_url", self.audio_url.as_deref(), 500)?;
        check_opt_len("etymology", self.etymology.as_deref(), 500)?;
        check_opt_len("usage_example", self.usage_example.as_deref(), 1000)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyVisualCreate {
    pub media_type: MediaType,
    pub media_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub alt_text: String,
    #[serde(default)]
    pub display_order: i64,
}

impl Validate for VocabularyVisualCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("media_url", &self.media_url, 500)?;
        check_opt_len("caption", self.caption.as_deref(), 500)?;
        check_len("alt_text", &self.alt_text, 300)?;
        Ok(())
    }
}

fn default_strength() -> i64 {
    MIN_CONNECTION_STRENGTH
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermConnectionCreate {
    pub source_term_id: i64,
    pub target_term_id: i64,
    pub relationship_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_strength")]
    pub strength: i64,
}

impl Validate for TermConnectionCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("relationship_type", &self.relationship_type, 50)?;
        check_opt_len("description", self.description.as_deref(), 500)?;
        check_range(
            "strength",
            self.strength,
            MIN_CONNECTION_STRENGTH,
            MAX_CONNECTION_STRENGTH,
        )?;
        Ok(())
    }
}
