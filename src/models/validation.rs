use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{field} must be greater than 0 (got {value})")]
    NotPositive { field: &'static str, value: i64 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("{field} must fit {max_digits} digits with {decimal_places} decimal places (got {value})")]
    Precision {
        field: &'static str,
        max_digits: u32,
        decimal_places: u32,
        value: String,
    },
    #[error("invalid decimal literal: {0:?}")]
    InvalidDecimal(String),
    #[error("unknown {kind} value: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Input shapes check their own field bounds before anything is persisted.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Bounds count characters, not bytes.
pub fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

pub fn check_opt_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

pub fn check_positive(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

pub fn check_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub fn check_opt_non_negative(
    field: &'static str,
    value: Option<i64>,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_non_negative(field, value),
        None => Ok(()),
    }
}

pub fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len_counts_chars() {
        assert!(check_len("term", "Proklamasi", 10).is_ok());
        assert!(check_len("term", "ééééé", 5).is_ok());
        assert_eq!(
            check_len("term", "abcdef", 5),
            Err(ValidationError::TooLong {
                field: "term",
                max: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_check_opt_len_none_passes() {
        assert!(check_opt_len("notes", None, 0).is_ok());
        assert!(check_opt_len("notes", Some("x"), 0).is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive("level_number", 1).is_ok());
        assert!(check_positive("level_number", 0).is_err());
        assert!(check_positive("level_number", -3).is_err());
    }

    #[test]
    fn test_check_range_is_closed() {
        assert!(check_range("strength", 1, 1, 5).is_ok());
        assert!(check_range("strength", 5, 1, 5).is_ok());
        assert!(check_range("strength", 0, 1, 5).is_err());
        assert!(check_range("strength", 6, 1, 5).is_err());
    }
}
