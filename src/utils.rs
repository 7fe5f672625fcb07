/// Utility functions for formatting and unit conversion
use std::time::Duration;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::TrackerError;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] - [hour]:[minute]:[second]");
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Convert a configured number of seconds into a Duration
///
/// Rejects negative, NaN and overflowing values.
pub fn seconds_to_duration(key: &str, seconds: f64) -> Result<Duration, TrackerError> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        TrackerError::InvalidConfiguration(format!(
            "{} must be a non-negative number of seconds, got {}",
            key, seconds
        ))
    })
}
