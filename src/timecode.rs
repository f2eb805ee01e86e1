//! Sample timestamps.
//!
//! Timestamps are integer hundredths of a second. Activity records cover one second
//! starting at the record header time, and samples within a record are spaced evenly
//! at the configured sample rate.
use chrono::{DateTime, Utc};

/// Timestamp ticks per second.
pub const TICKS_PER_SECOND: u32 = 100;

/// Timestamp of sample `i` in a record starting at `payload_start`.
///
/// `start_time` is the device start time from the Parameters record. Timestamps are
/// relative to it, so a sample at the start time is 0.
#[must_use]
pub fn timestamp(payload_start: u32, start_time: u32, i: usize, sample_rate: u32) -> i64 {
    let elapsed = i64::from(payload_start) - i64::from(start_time);
    let offset = i as f64 * (1.0 / f64::from(sample_rate));
    ((elapsed as f64 + offset) * f64::from(TICKS_PER_SECOND)).round() as i64
}

/// Convert seconds since the Unix epoch plus a tick count into a UTC datetime.
///
/// Returns `None` if the result is out of range for ``chrono``.
#[must_use]
pub fn to_datetime(seconds: u32, ticks: i64) -> Option<DateTime<Utc>> {
    let millis = i64::from(seconds) * 1_000 + ticks * 10;
    DateTime::from_timestamp_millis(millis)
}
