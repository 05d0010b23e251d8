//! Custom field validators shared by the write inputs.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Money amounts must not be negative.
pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(error("non_negative", "Must be zero or more"));
    }
    Ok(())
}

/// Rates and distances must be strictly positive.
pub fn positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(error("positive", "Must be greater than zero"));
    }
    Ok(())
}

/// Slugs are lowercase ASCII letters, digits, and single hyphens.
pub fn slug(value: &str) -> Result<(), ValidationError> {
    let well_formed = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !well_formed {
        return Err(error(
            "slug",
            "Use lowercase letters, numbers, and single hyphens",
        ));
    }
    Ok(())
}
