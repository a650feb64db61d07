//! Property-based tests for the step validators

use pesajes::weighing::validators::{
    decimal_in_range, identity_number, integer_in_range, positive_decimal, vehicle_plate,
    DEAD_COUNT_RANGE, UNIT_COUNT_RANGE, WEIGHT_RANGE_KG,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn identity_rejects_any_non_digit(prefix in "[0-9]{0,6}", bad in "[^0-9]", suffix in "[0-9]{0,6}") {
        let raw = format!("{prefix}{bad}{suffix}");
        prop_assert!(identity_number(&raw).is_err());
    }

    #[test]
    fn identity_accepts_digit_strings(raw in "[0-9]{1,15}") {
        prop_assert_eq!(identity_number(&raw).unwrap(), raw);
    }

    #[test]
    fn plate_accepts_three_letters_three_digits(letters in "[A-Za-z]{3}", digits in "[0-9]{3}") {
        let plate = vehicle_plate(&format!("{letters}{digits}")).unwrap();
        prop_assert_eq!(plate, format!("{}{digits}", letters.to_uppercase()));
    }

    #[test]
    fn plate_rejects_digits_first(digits in "[0-9]{3}", letters in "[A-Za-z]{3}") {
        let reversed = format!("{digits}{letters}");
        prop_assert!(vehicle_plate(&reversed).is_err());
    }

    #[test]
    fn unit_count_matches_range(value in -10_000i64..10_000) {
        let accepted = integer_in_range(&value.to_string(), UNIT_COUNT_RANGE).is_ok();
        prop_assert_eq!(accepted, (1..=5000).contains(&value));
    }

    #[test]
    fn dead_count_accepts_zero_to_thousand(value in 0u32..=1000) {
        prop_assert_eq!(integer_in_range(&value.to_string(), DEAD_COUNT_RANGE).unwrap(), value);
    }

    #[test]
    fn comma_and_period_parse_alike(whole in 1u32..100_000, frac in 1u32..100) {
        let with_comma = positive_decimal(&format!("{whole},{frac}")).unwrap();
        let with_period = positive_decimal(&format!("{whole}.{frac}")).unwrap();
        prop_assert_eq!(with_comma, with_period);
    }

    #[test]
    fn weight_above_limit_is_rejected(whole in 100_001u32..10_000_000) {
        prop_assert!(decimal_in_range(&whole.to_string(), WEIGHT_RANGE_KG).is_err());
    }
}
