//! Month-granularity dates.
//!
//! Subscription dates are stored as the first instant of a calendar month in
//! UTC. Every value produced here is normalized that way, so month arithmetic
//! only has to look at the `(year, month)` pair.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use thiserror::Error;

/// Wire format of a month, e.g. `07-2025`.
pub const MONTH_YEAR_FORMAT: &str = "%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    #[error("invalid month format {0:?}, expected MM-YYYY")]
    InvalidFormat(String),
}

/// Parses `MM-YYYY` into the first instant of that month (UTC).
///
/// The month must be exactly two digits in `01..=12` and the year exactly four
/// digits. Any other shape is rejected.
pub fn parse_month_year(input: &str) -> Result<DateTime<Utc>, MonthParseError> {
    let invalid = || MonthParseError::InvalidFormat(input.to_string());

    let (month, year) = input.split_once('-').ok_or_else(invalid)?;
    if month.len() != 2
        || year.len() != 4
        || !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    first_instant_of(year, month).ok_or_else(invalid)
}

/// Renders a date as `MM-YYYY`.
pub fn format_month_year(date: &DateTime<Utc>) -> String {
    date.format(MONTH_YEAR_FORMAT).to_string()
}

/// Drops day and time, keeping the first instant of the month.
pub fn truncate_to_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    first_instant_of(instant.year(), instant.month()).unwrap_or(instant)
}

/// Number of calendar months from `start` to `end`, both ends counted.
///
/// Same month gives 1. Returns zero or a negative count when `end` is in an
/// earlier month than `start`; callers check ordering first.
pub fn months_inclusive(start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// True for the unset date (`01-0001`, 00:00 UTC).
pub fn zero_month(date: &DateTime<Utc>) -> bool {
    date.year() == 1
        && date.ordinal() == 1
        && date.num_seconds_from_midnight() == 0
        && date.nanosecond() == 0
}

fn first_instant_of(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}
