use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{MediaType, StudentGrade};
use crate::models::validation::{check_len, check_opt_len, check_positive, Validate, ValidationError};
use crate::models::JsonObject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub grade_level: StudentGrade,
    pub subject: String,
    pub duration_minutes: i64,
    pub learning_objectives: Vec<String>,
    pub curriculum_alignment: JsonObject,
    pub gamification_elements: JsonObject,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_validated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingMaterial {
    pub id: i64,
    pub lesson_plan_id: i64,
    pub title: String,
    pub material_type: MediaType,
    pub file_path: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySheet {
    pub id: i64,
    pub lesson_plan_id: i64,
    pub title: String,
    pub instructions: String,
    /// Free text such as `collaborative`, `exploratory` or `individual`.
    pub activity_type: String,
    pub estimated_time_minutes: i64,
    pub materials_needed: Vec<String>,
    pub assessment_criteria: JsonObject,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonPlanCreate {
    pub title: String,
    pub description: String,
    pub grade_level: StudentGrade,
    pub subject: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub curriculum_alignment: JsonObject,
    #[serde(default)]
    pub gamification_elements: JsonObject,
}

impl Validate for LessonPlanCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("title", &self.title, 200)?;
        check_len("description", &self.description, 1000)?;
        check_len("subject", &self.subject, 100)?;
        check_positive("duration_minutes", self.duration_minutes)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingMaterialCreate {
    pub title: String,
    pub material_type: MediaType,
    pub file_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

impl Validate for TeachingMaterialCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("title", &self.title, 200)?;
        check_len("file_path", &self.file_path, 500)?;
        check_opt_len("description", self.description.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySheetCreate {
    pub title: String,
    pub instructions: String,
    pub activity_type: String,
    pub estimated_time_minutes: i64,
    #[serde(default)]
    pub materials_needed: Vec<String>,
    #[serde(default)]
    pub assessment_criteria: JsonObject,
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Validate for ActivitySheetCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("title", &self.title, 200)?;
        check_len("instructions", &self.instructions, 2000)?;
        check_len("activity_type", &self.activity_type, 50)?;
        check_positive("estimated_time_minutes", self.estimated_time_minutes)?;
        check_opt_len("file_path", self.file_path.as_deref(), 500)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_plan_duration_must_be_positive() {
        let input: LessonPlanCreate = serde_json::from_str(
            r#"{
                "title": "Kerajaan Majapahit",
                "description": "Pengantar",
                "grade_level": "5",
                "subject": "IPS",
                "duration_minutes": 0
            }"#,
        )
        .unwrap();
        assert!(input.learning_objectives.is_empty());
        assert!(input.curriculum_alignment.is_empty());
        assert!(matches!(
            input.validate(),
            Err(ValidationError::NotPositive { field: "duration_minutes", .. })
        ));
    }

    #[test]
    fn test_activity_type_bound() {
        let input = ActivitySheetCreate {
            title: "Peta".to_string(),
            instructions: "Tandai kerajaan".to_string(),
            activity_type: "x".repeat(51),
            estimated_time_minutes: 15,
            materials_needed: vec![],
            assessment_criteria: JsonObject::new(),
            file_path: None,
        };
        assert!(input.validate().is_err());
    }
}
