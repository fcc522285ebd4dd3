//! Augmented reality: a trigger (recognition target) and a 3D model combine
//! into an experience; sessions record usage of an experience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::decimal::Decimal;
use crate::models::enums::{ARSessionStatus, ARTriggerType, StudentGrade};
use crate::models::validation::{
    check_len, check_opt_len, check_opt_non_negative, Validate, ValidationError,
};
use crate::models::JsonObject;

/// NUMERIC(5, 3)
pub const SCALE_FACTOR_DIGITS: u32 = 5;
pub const SCALE_FACTOR_PLACES: u32 = 3;
/// NUMERIC(8, 2)
pub const FILE_SIZE_DIGITS: u32 = 8;
pub const FILE_SIZE_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ARTrigger {
    pub id: i64,
    pub trigger_type: ARTriggerType,
    pub trigger_name: String,
    pub description: String,
    /// Image features, QR payload and the like; opaque to this crate.
    pub recognition_data: JsonObject,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ARModel {
    pub id: i64,
    pub historical_figure_id: Option<i64>,
    pub model_name: String,
    pub model_file_path: String,
    pub texture_file_path: Option<String>,
    pub animation_file_path: Option<String>,
    pub scale_factor: Decimal,
    pub animation_triggers: Vec<String>,
    pub interaction_points: JsonObject,
    pub file_size_mb: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ARExperience {
    pub id: i64,
    pub ar_trigger_id: i64,
    pub ar_model_id: i64,
    pub experience_name: String,
    pub description: String,
    pub interactive_elements: JsonObject,
    pub storytelling_content: JsonObject,
    pub audio_narration_url: Option<String>,
    pub duration_seconds: Option<i64>,
    pub grade_level: StudentGrade,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ARSession {
    pub id: i64,
    /// `None` for anonymous usage.
    pub student_id: Option<i64>,
    pub ar_experience_id: i64,
    pub session_start: DateTime<Utc>,
    pub session_end: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub interactions_count: i64,
    pub completion_status: ARSessionStatus,
    pub device_info: Option<JsonObject>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARTriggerCreate {
    pub trigger_type: ARTriggerType,
    pub trigger_name: String,
    pub description: String,
    #[serde(default)]
    pub recognition_data: JsonObject,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for ARTriggerCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("trigger_name", &self.trigger_name, 100)?;
        check_len("description", &self.description, 500)?;
        Ok(())
    }
}

fn default_scale_factor() -> Decimal {
    Decimal::new(1000, SCALE_FACTOR_PLACES)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARModelCreate {
    #[serde(default)]
    pub historical_figure_id: Option<i64>,
    pub model_name: String,
    pub model_file_path: String,
    #[serde(default)]
    pub texture_file_path: Option<String>,
    #[serde(default)]
    pub animation_file_path: Option<String>,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: Decimal,
    #[serde(default)]
    pub animation_triggers: Vec<String>,
    #[serde(default)]
    pub interaction_points: JsonObject,
    #[serde(default)]
    pub file_size_mb: Option<Decimal>,
}

impl ARModelCreate {
    /// Decimal attributes at exactly their declared number of places.
    pub fn fixed_decimals(&self) -> Result<(Decimal, Option<Decimal>), ValidationError> {
        let scale_factor =
            self.scale_factor
                .with_precision("scale_factor", SCALE_FACTOR_DIGITS, SCALE_FACTOR_PLACES)?;
        let file_size_mb = self
            .file_size_mb
            .map(|size| size.with_precision("file_size_mb", FILE_SIZE_DIGITS, FILE_SIZE_PLACES))
            .transpose()?;
        Ok((scale_factor, file_size_mb))
    }
}

impl Validate for ARModelCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("model_name", &self.model_name, 100)?;
        check_len("model_file_path", &self.model_file_path, 500)?;
        check_opt_len("texture_file_path", self.texture_file_path.as_deref(), 500)?;
        check_opt_len("animation_file_path", self.animation_file_path.as_deref(), 500)?;
        self.fixed_decimals()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARExperienceCreate {
    pub ar_trigger_id: i64,
    pub ar_model_id: i64,
    pub experience_name: String,
    pub description: String,
    #[serde(default)]
    pub interactive_elements: JsonObject,
    #[serde(default)]
    pub storytelling_content: JsonObject,
    #[serde(default)]
    pub audio_narration_url: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    pub grade_level: StudentGrade,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for ARExperienceCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("experience_name", &self.experience_name, 100)?;
        check_len("description", &self.description, 500)?;
        check_opt_len("audio_narration_url", self.audio_narration_url.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ARSessionCreate {
    pub ar_experience_id: i64,
    #[serde(default)]
    pub device_info: Option<JsonObject>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ARSessionEnd {
    pub status: ARSessionStatus,
    #[serde(default)]
    pub interactions_count: Option<i64>,
}

impl Validate for ARSessionEnd {
    fn validate(&self) -> Result<(), ValidationError> {
        check_opt_non_negative("interactions_count", self.interactions_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(scale_factor: &str, file_size_mb: Option<&str>) -> ARModelCreate {
        ARModelCreate {
            historical_figure_id: None,
            model_name: "Candi Borobudur".to_string(),
            model_file_path: "/models/borobudur.glb".to_string(),
            texture_file_path: None,
            animation_file_path: None,
            scale_factor: Decimal::parse(scale_factor).unwrap(),
            animation_triggers: vec![],
            interaction_points: JsonObject::new(),
            file_size_mb: file_size_mb.map(|s| Decimal::parse(s).unwrap()),
        }
    }

    #[test]
    fn test_scale_factor_default() {
        let parsed: ARModelCreate = serde_json::from_str(
            r#"{"model_name":"Keris","model_file_path":"/models/keris.glb"}"#,
        )
        .unwrap();
        assert_eq!(parsed.scale_factor.to_string(), "1.000");
    }

    #[test]
    fn test_decimal_precision_checks() {
        let (scale, size) = model("0.5", Some("12.3")).fixed_decimals().unwrap();
        assert_eq!(scale.to_string(), "0.500");
        assert_eq!(size.unwrap().to_string(), "12.30");

        assert!(model("1.2345", None).validate().is_err());
        assert!(model("100.000", None).validate().is_err());
        assert!(model("1", Some("1000000.00")).validate().is_err());
        assert!(model("1", Some("999999.99")).validate().is_ok());
    }

    #[test]
    fn test_session_end_rejects_unknown_status() {
        assert!(serde_json::from_str::<ARSessionEnd>(r#"{"status":"paused"}"#).is_err());
        let end: ARSessionEnd = serde_json::from_str(r#"{"status":"abandoned"}"#).unwrap();
        assert_eq!(end.status, ARSessionStatus::Abandoned);
    }

    #[test]
    fn test_session_end_rejects_negative_interactions() {
        let end = ARSessionEnd {
            status: ARSessionStatus::Completed,
            interactions_count: Some(-1),
        };
        assert_eq!(
            end.validate(),
            Err(ValidationError::Negative {
                field: "interactions_count",
                value: -1
            })
        );
    }
}
