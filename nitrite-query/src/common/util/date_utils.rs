use chrono::Utc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, or zero if the clock is before it.
#[inline]
pub fn get_current_time_or_zero() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Wall-clock timestamp used to stamp the `_modified` field of a document.
#[inline]
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}
