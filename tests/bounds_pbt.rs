//! Property-based tests for bounded attributes and fixed-precision decimals.

use proptest::prelude::*;

use sejarah_backend_rust::models::{
    completion_percentage, Decimal, TermConnectionCreate, TimelineEventCreate, Validate,
    COMPLETION_PERCENTAGE_DIGITS, COMPLETION_PERCENTAGE_PLACES, MAX_CONNECTION_STRENGTH,
    MAX_IMPORTANCE_LEVEL, MIN_CONNECTION_STRENGTH, MIN_IMPORTANCE_LEVEL,
};

fn connection(strength: i64) -> TermConnectionCreate {
    TermConnectionCreate {
        source_term_id: 1,
        target_term_id: 2,
        relationship_type: "related_to".to_string(),
        description: None,
        strength,
    }
}

fn event(importance_level: i64) -> TimelineEventCreate {
    TimelineEventCreate {
        title: "event".to_string(),
        description: "event".to_string(),
        event_date: None,
        event_year: None,
        importance_level,
        location: None,
        display_order: 0,
    }
}

proptest! {
    #[test]
    fn prop_strength_accepted_only_in_closed_range(strength in -100i64..100) {
        let in_range = (MIN_CONNECTION_STRENGTH..=MAX_CONNECTION_STRENGTH).contains(&strength);
        prop_assert_eq!(connection(strength).validate().is_ok(), in_range);
    }

    #[test]
    fn prop_importance_accepted_only_in_closed_range(level in -100i64..100) {
        let in_range = (MIN_IMPORTANCE_LEVEL..=MAX_IMPORTANCE_LEVEL).contains(&level);
        prop_assert_eq!(event(level).validate().is_ok(), in_range);
    }

    #[test]
    fn prop_completion_percentage_fits_column(total in 1i64..10_000, read in -10i64..20_000) {
        let percentage = completion_percentage(read, total).expect("positive total");
        prop_assert_eq!(percentage.scale(), COMPLETION_PERCENTAGE_PLACES);
        prop_assert!(!percentage.is_negative());
        prop_assert!(percentage <= Decimal::new(100, 0));

        let checked = percentage
            .with_precision("completion_percentage", COMPLETION_PERCENTAGE_DIGITS, COMPLETION_PERCENTAGE_PLACES)
            .expect("within NUMERIC(5, 2)");
        prop_assert_eq!(checked, percentage);
    }

    #[test]
    fn prop_decimal_text_round_trip_is_exact(units in -9_999_999i64..9_999_999, scale in 0u32..6) {
        let value = Decimal::new(units, scale);
        let text = value.to_string();
        let parsed = Decimal::parse(&text).expect("canonical text parses");
        prop_assert_eq!(parsed, value);
        prop_assert_eq!(parsed.scale(), scale);
        prop_assert_eq!(parsed.to_string(), text);
    }
}
