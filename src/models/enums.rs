//! Closed enumerations shared by the schema.
//!
//! The string literals are part of the storage and wire contract: they are
//! written to TEXT columns as-is and must round-trip exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::validation::ValidationError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $literal:tt),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $literal)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $literal,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($literal => Ok($name::$variant),)+
                    _ => Err(ValidationError::UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Primary-school grade a student, lesson or text is pitched at.
    StudentGrade, "grade" {
        Grade4 => "4",
        Grade5 => "5",
        Grade6 => "6",
    }
}

text_enum! {
    QuestionDifficulty, "difficulty" {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

text_enum! {
    QuestionType, "question type" {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        ShortAnswer => "short_answer",
    }
}

text_enum! {
    BadgeType, "badge type" {
        LevelCompletion => "level_completion",
        Streak => "streak",
        PerfectScore => "perfect_score",
        Explorer => "explorer",
        Scholar => "scholar",
    }
}

text_enum! {
    MediaType, "media type" {
        Image => "image",
        Audio => "audio",
        Video => "video",
        Document => "document",
        Model3d => "model_3d",
    }
}

text_enum! {
    /// Physical or printed target that launches an AR experience.
    ARTriggerType, "AR trigger type" {
        Banknote => "banknote",
        Stamp => "stamp",
        TextbookImage => "textbook_image",
        QrCode => "qr_code",
    }
}

text_enum! {
    ARSessionStatus, "AR session status" {
        Started => "started",
        Completed => "completed",
        Abandoned => "abandoned",
    }
}

impl Default for ARSessionStatus {
    fn default() -> Self {
        ARSessionStatus::Started
    }
}

impl ARSessionStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, ARSessionStatus::Completed | ARSessionStatus::Abandoned)
    }

    pub fn can_transition_to(self, target: ARSessionStatus) -> bool {
        matches!(
            (self, target),
            (ARSessionStatus::Started, ARSessionStatus::Completed)
                | (ARSessionStatus::Started, ARSessionStatus::Abandoned)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_round_trip() {
        for grade in StudentGrade::ALL {
            assert_eq!(grade.as_str().parse::<StudentGrade>().unwrap(), *grade);
        }
        for media in MediaType::ALL {
            assert_eq!(media.as_str().parse::<MediaType>().unwrap(), *media);
        }
        for trigger in ARTriggerType::ALL {
            assert_eq!(trigger.to_string().parse::<ARTriggerType>().unwrap(), *trigger);
        }
    }

    #[test]
    fn test_unknown_literal_rejected() {
        assert!("7".parse::<StudentGrade>().is_err());
        assert!("EASY".parse::<QuestionDifficulty>().is_err());
        assert!("model3d".parse::<MediaType>().is_err());
        assert!("".parse::<BadgeType>().is_err());

        let err = "essay".parse::<QuestionType>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownVariant {
                kind: "question type",
                value: "essay".to_string()
            }
        );
    }

    #[test]
    fn test_serde_uses_wire_literals() {
        let json = serde_json::to_string(&MediaType::Model3d).unwrap();
        assert_eq!(json, "\"model_3d\"");

        let grade: StudentGrade = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(grade, StudentGrade::Grade5);

        assert!(serde_json::from_str::<StudentGrade>("5").is_err());
        assert!(serde_json::from_str::<BadgeType>("\"legendary\"").is_err());
    }

    #[test]
    fn test_session_status_transitions() {
        use ARSessionStatus::*;

        assert!(Started.can_transition_to(Completed));
        assert!(Started.can_transition_to(Abandoned));
        assert!(!Started.can_transition_to(Started));
        assert!(!Completed.can_transition_to(Abandoned));
        assert!(!Abandoned.can_transition_to(Completed));
        assert!(Completed.is_terminal());
        assert!(!Started.is_terminal());
        assert_eq!(ARSessionStatus::default(), Started);
    }
}
