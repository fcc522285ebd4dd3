pub mod ar;
pub mod badge;
pub mod decimal;
pub mod enums;
pub mod hero_diary;
pub mod lesson;
pub mod quiz;
pub mod user;
pub mod validation;
pub mod vocabulary;

pub use ar::*;
pub use badge::*;
pub use decimal::Decimal;
pub use enums::*;
pub use hero_diary::*;
pub use lesson::*;
pub use quiz::*;
pub use user::*;
pub use validation::{Validate, ValidationError};
pub use vocabulary::*;

/// Free-form JSON object attribute; its internal shape is not validated.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
