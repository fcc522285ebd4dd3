use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::StudentGrade;
use crate::models::validation::{check_len, check_opt_len, Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_teacher: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-to-one with [`User`]. Nothing prevents the same user from also
/// holding a [`TeacherProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub user_id: i64,
    pub grade: StudentGrade,
    pub school_name: String,
    pub total_points: i64,
    pub current_level: i64,
    pub streak_days: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub id: i64,
    pub user_id: i64,
    pub school_name: String,
    pub certification_number: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_teacher: bool,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("username", &self.username, 50)?;
        check_len("email", &self.email, 255)?;
        check_len("full_name", &self.full_name, 100)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_teacher: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_opt_len("email", self.email.as_deref(), 255)?;
        check_opt_len("full_name", self.full_name.as_deref(), 100)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCreate {
    pub grade: StudentGrade,
    pub school_name: String,
}

impl Validate for StudentCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("school_name", &self.school_name, 200)
    }
}

/// Values computed by the points/streak logic that lives outside this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentProgressUpdate {
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub current_level: Option<i64>,
    #[serde(default)]
    pub streak_days: Option<i64>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherCreate {
    pub school_name: String,
    #[serde(default)]
    pub certification_number: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl Validate for TeacherCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_len("school_name", &self.school_name, 200)?;
        check_opt_len("certification_number", self.certification_number.as_deref(), 50)?;
        check_opt_len("specialization", self.specialization.as_deref(), 100)?;
        Ok(())
    }
}
