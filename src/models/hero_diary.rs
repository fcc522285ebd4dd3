//! Hero's Diary: historical figures with diary entries, timelines, media and
//! per-student reading progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::decimal::Decimal;
use crate::models::enums::{MediaType, StudentGrade};
use crate::models::validation::{
    check_len, check_opt_len, check_opt_non_negative, check_range, Validate, ValidationError,
};

pub const MIN_IMPORTANCE_LEVEL: i64 = 1;
pub const MAX_IMPORTANCE_LEVEL: i64 = 5;

/// NUMERIC(5, 2)
pub const COMPLETION_PERCENTAGE_DIGITS: u32 = 5;
pub const COMPLETION_PERCENTAGE_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalFigure {
    pub id: i64,
    pub historical_period_id: Option<i64>,
    pub name: String,
    pub birth_year: Option<i64>,
    pub death_year: Option<i64>,
    pub birth_place: Option<String>,
    pub occupation: Option<String>,
    pub biography_summary: String,
    pub major_contributions: Vec<String>,
    pub famous_quotes: Vec<String>,
    pub portrait_url: Option<String>,
    pub is_featured: bool,
    pub reading_level: StudentGrade,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: i64,
    pub historical_figure_id: i64,
    pub title: String,
    pub entry_text: String,
    /// Historical date of the entry when known.
    pub entry_date: Option<DateTime<Utc>>,
    pub historical_context: String,
    pub emotional_tone: Option<String>,
    pub display_order: i64,
    pub is_fictional: bool,
    pub sources: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: i64,
    pub historical_figure_id: i64,
    pub title: String,
    pub description: String,
    pub event_date: Option<DateTime<Utc>>,
    /// Used when only the year is known.
    pub event_year: Option<i64>,
    pub importance_level: i64,
    pub location: Option<String>,
    pub display_order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureMultimedia {
    pub id: i64,
    pub historical_figure_id: i64,
    pub media_type: MediaType,
    pub media_url: String,
    pub title: String,
    pub description: Option<String>,
    pub source_attribution: Option<String>,
    pub display_order: i64,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroDiaryProgress {
    pub id: i64,
    pub student_id: i64,
    pub historical_figure_id: i64,
    pub entries_read: i64,
    pub total_entries: i64,
    pub completion_percentage: Decimal,
    pub last_accessed: DateTime<Utc>,
    pub favorite_entries: Vec<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalFigureCreate {
    #[serde(default)]
    pub historical_period_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i64>,
    #[serde(default)]
    pub death_year: Option<i64>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    pub biography_summary: String,
    #[serde(default)]
    pub major_contributions: Vec<String>,
    #[serde(default)]
    pub famous_quotes: Vec<String>,
    #[serde(default)]
    pub portrait_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub reading_level: StudentGrade,
}

impl Validate for HistoricalFigureCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, 100)?;
        check_opt_len("birth_place", self.birth_place.as_deref(), 200)?;
        check_opt_len("occupation", self.occupation.as_deref(), 100)?;
        check_len("biography_summary", &self.biography_summary, 2000)?;
        check_opt_len("portrait_url", self.portrait_url.as_deref(), 500)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_sources() -> Option<Vec<String>> {
    Some(Vec::new())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntryCreate {
    pub title: String,
    pub entry_text: String,
    #[serde(default)]
    pub entry_date: Option<DateTime<Utc>>,
    pub historical_context: String,
    #[serde(default)]
    pub emotional_tone: Option<String>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default = "default_true")]
    pub is_fictional: bool,
    #[serde(default = "default_sources")]
    pub sources: Option<Vec<String>>,
}

impl Validate for DiaryEntryCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("title", &self.title, 200)?;
        check_len("entry_text", &self.entry_text, 5000)?;
        check_len("historical_context", &self.historical_context, 1000)?;
        check_opt_len("emotional_tone", self.emotional_tone.as_deref(), 50)?;
        Ok(())
    }
}

fn default_importance() -> i64 {
    MIN_IMPORTANCE_LEVEL
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEventCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_year: Option<i64>,
    #[serde(default = "default_importance")]
    pub importance_level: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

impl Validate for TimelineEventCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("title", &self.title, 200)?;
        check_len("description", &self.description, 1000)?;
        check_range(
            "importance_level",
            self.importance_level,
            MIN_IMPORTANCE_LEVEL,
            MAX_IMPORTANCE_LEVEL,
        )?;
        check_opt_len("location", self.location.as_deref(), 200)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureMultimediaCreate {
    pub media_type: MediaType,
    pub media_url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_attribution: Option<String>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub is_primary: bool,
}

impl Validate for FigureMultimediaCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("media_url", &self.media_url, 500)?;
        check_len("title", &self.title, 200)?;
        check_opt_len("description", self.description.as_deref(), 500)?;
        check_opt_len("source_attribution", self.source_attribution.as_deref(), 300)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeroDiaryProgressUpdate {
    #[serde(default)]
    pub entries_read: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite_entries: Option<Vec<i64>>,
}

impl Validate for HeroDiaryProgressUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_opt_non_negative("entries_read", self.entries_read)?;
        check_opt_len("notes", self.notes.as_deref(), 2000)
    }
}

/// Reading completion for `entries_read` of `total_entries`, capped at 100.
pub fn completion_percentage(entries_read: i64, total_entries: i64) -> Option<Decimal> {
    if total_entries <= 0 {
        return None;
    }
    let read = entries_read.clamp(0, total_entries);
    Decimal::from_ratio_percent(read, total_entries, COMPLETION_PERCENTAGE_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_level_bounds() {
        let mut event = TimelineEventCreate {
            title: "Sumpah Palapa".to_string(),
            description: "Gajah Mada bersumpah".to_string(),
            event_date: None,
            event_year: Some(1336),
            importance_level: 5,
            location: None,
            display_order: 0,
        };
        assert!(event.validate().is_ok());

        event.importance_level = 6;
        assert!(matches!(
            event.validate(),
            Err(ValidationError::OutOfRange { field: "importance_level", .. })
        ));

        event.importance_level = 0;
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_diary_entry_defaults() {
        let entry: DiaryEntryCreate = serde_json::from_str(
            r#"{"title":"Hari pertama","entry_text":"...","historical_context":"1945"}"#,
        )
        .unwrap();
        assert!(entry.is_fictional);
        assert_eq!(entry.sources, Some(vec![]));
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(3, 4).unwrap().to_string(), "75.00");
        assert_eq!(completion_percentage(1, 3).unwrap().to_string(), "33.33");
        assert_eq!(completion_percentage(9, 4).unwrap().to_string(), "100.00");
        assert_eq!(completion_percentage(-1, 4).unwrap().to_string(), "0.00");
        assert!(completion_percentage(1, 0).is_none());
    }

    #[test]
    fn test_progress_update_rejects_negative_entries_read() {
        let update = HeroDiaryProgressUpdate {
            entries_read: Some(-2),
            notes: None,
            favorite_entries: None,
        };
        assert_eq!(
            update.validate(),
            Err(ValidationError::Negative {
                field: "entries_read",
                value: -2
            })
        );
    }
}
