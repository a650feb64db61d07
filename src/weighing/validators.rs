//! Step validators.
//!
//! Every validator is a pure function from raw input to a Validation Outcome.
//! Bad input is an ordinary `Err`, never a panic.

use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use super::errors::ValidationError;
use super::types::{Choice, ImageRef, Input};

pub type Validation<T> = Result<T, ValidationError>;

pub const UNIT_COUNT_RANGE: RangeInclusive<u32> = 1..=5000;
pub const LIVE_COUNT_RANGE: RangeInclusive<u32> = 0..=5000;
pub const DEAD_COUNT_RANGE: RangeInclusive<u32> = 0..=1000;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 0.01..=100_000.0;

static PLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{3}[0-9]{3}$").expect("plate pattern compiles"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+([.,][0-9]+)?$").expect("decimal pattern compiles"));

/// Identity document number: ASCII digits only, nothing else (not even spaces)
pub fn identity_number(raw: &str) -> Validation<String> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotDigits);
    }
    Ok(raw.to_string())
}

/// Vehicle plate: three letters followed by three digits, returned uppercase
pub fn vehicle_plate(raw: &str) -> Validation<String> {
    let candidate = raw.trim();
    if !PLATE.is_match(candidate) {
        return Err(ValidationError::InvalidPlate);
    }
    Ok(candidate.to_ascii_uppercase())
}

pub fn integer_in_range(raw: &str, range: RangeInclusive<u32>) -> Validation<u32> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger)?;

    let out_of_range = ValidationError::OutOfRange {
        min: *range.start(),
        max: *range.end(),
    };
    let value = u32::try_from(value).map_err(|_| out_of_range.clone())?;
    if !range.contains(&value) {
        return Err(out_of_range);
    }
    Ok(value)
}

/// Positive decimal; comma and period are both accepted as the separator
pub fn positive_decimal(raw: &str) -> Validation<f64> {
    let candidate = raw.trim();
    if !DECIMAL.is_match(candidate) {
        return Err(ValidationError::NotAPositiveQuantity);
    }
    let value: f64 = candidate
        .replace(',', ".")
        .parse()
        .map_err(|_| ValidationError::NotAPositiveQuantity)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::NotAPositiveQuantity);
    }
    Ok(value)
}

pub fn decimal_in_range(raw: &str, range: RangeInclusive<f64>) -> Validation<f64> {
    let value = positive_decimal(raw)?;
    if !range.contains(&value) {
        return Err(ValidationError::QuantityOutOfRange {
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(value)
}

pub fn free_text(raw: &str) -> Validation<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(trimmed.to_string())
}

/// The input must be an image attachment
pub fn image(input: &Input) -> Validation<ImageRef> {
    match input {
        Input::Image(reference) => Ok(reference.clone()),
        Input::Text(_) => Err(ValidationError::ExpectedImage),
    }
}

/// The input must be text
pub fn text(input: &Input) -> Validation<&str> {
    input.as_text().ok_or(ValidationError::ExpectedText)
}

/// Pick one of `offered` by its 1-based number, label or alias
pub fn choice<T: Choice>(raw: &str, offered: &[T]) -> Validation<T> {
    let wanted = fold(raw);

    if let Ok(number) = wanted.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| offered.get(index))
            .copied()
            .ok_or(ValidationError::UnknownOption);
    }

    offered
        .iter()
        .find(|option| {
            fold(option.label()) == wanted || option.aliases().iter().any(|alias| fold(alias) == wanted)
        })
        .copied()
        .ok_or(ValidationError::UnknownOption)
}

/// Find an option by label or alias among all variants, ignoring numbers
pub fn named<T: Choice>(raw: &str, all: &[T]) -> Option<T> {
    let wanted = fold(raw);
    all.iter()
        .find(|option| {
            fold(option.label()) == wanted || option.aliases().iter().any(|alias| fold(alias) == wanted)
        })
        .copied()
}

/// Lowercase, strip Spanish accents and collapse whitespace
fn fold(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
