use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::BadgeType;
use crate::models::validation::{check_len, Validate, ValidationError};
use crate::models::JsonObject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub badge_type: BadgeType,
    pub icon_url: String,
    pub criteria: JsonObject,
    pub points_reward: i64,
    pub is_active: bool,
}

/// Join row between [`Badge`] and a student profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentBadge {
    pub id: i64,
    pub student_id: i64,
    pub badge_id: i64,
    pub earned_at: DateTime<Utc>,
    pub progress_data: Option<JsonObject>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeCreate {
    pub name: String,
    pub description: String,
    pub badge_type: BadgeType,
    pub icon_url: String,
    #[serde(default)]
    pub criteria: JsonObject,
    #[serde(default)]
    pub points_reward: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for BadgeCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, 100)?;
        check_len("description", &self.description, 500)?;
        check_len("icon_url", &self.icon_url, 500)?;
        Ok(())
    }
}
