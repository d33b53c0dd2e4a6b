//! Helpers for resolving the service's configured timezone.
//!
//! Day and month bucketing in the ledger and calendar compare against the
//! user's local day, so every conversion from an event timestamp to a
//! calendar date goes through these helpers.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Resolve a canonical timezone name, e.g. "Asia/Seoul", to a UTC offset.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Resolve a canonical timezone name, falling back to UTC with a warning
/// when the name is unknown.
pub fn local_offset_or_utc(canonical_timezone: &str) -> UtcOffset {
    match get_local_offset(canonical_timezone) {
        Some(offset) => offset,
        None => {
            tracing::warn!("unknown timezone {canonical_timezone:?}, falling back to UTC");
            UtcOffset::UTC
        }
    }
}

/// The current calendar date in the given offset.
pub fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// The calendar date an event timestamp falls on in the given offset.
pub fn local_date(timestamp: OffsetDateTime, offset: UtcOffset) -> Date {
    timestamp.to_offset(offset).date()
}

/// Convert a 1-12 month number to a [time::Month].
///
/// # Errors
/// Returns [crate::Error::InvalidMonth] for numbers outside 1-12.
pub fn month_from_number(month: u8) -> Result<time::Month, crate::Error> {
    time::Month::try_from(month).map_err(|_| crate::Error::InvalidMonth(month))
}
