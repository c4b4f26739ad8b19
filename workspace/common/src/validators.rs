//! Field validators shared by request payloads.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Money amounts are stored as positive numbers; the direction lives in the type.
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}

pub fn non_negative_rate(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("rate_must_not_be_negative"));
    }
    Ok(())
}

/// Weekday numbers run from 0 (Monday) to 6 (Sunday).
pub fn weekday_numbers(value: &[u8]) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("weekday_list_empty"));
    }
    if value.iter().any(|day| *day > 6) {
        return Err(ValidationError::new("weekday_out_of_range"));
    }
    Ok(())
}
