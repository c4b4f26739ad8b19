//! Calendar helpers shared by the recurrence and amortization engines.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{ComputeError, Result};

/// Shifts `date` by `months`, clamping the day to the end of the target month.
///
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| ComputeError::Date(format!("{} + {} months is out of range", date, months)))
}

pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| ComputeError::Date(format!("{} + {} days is out of range", date, days)))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
