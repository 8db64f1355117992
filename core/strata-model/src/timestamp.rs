//! Wall-clock helpers for entity lifecycle timestamps.
//!
//! Timestamps are milliseconds since the Unix epoch, stored as `i64`.

use chrono::Utc;

/// Returns the current wall time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns a timestamp strictly greater than `previous`, tracking wall time.
///
/// Two writes landing in the same millisecond still observe distinct
/// `updated_at` values.
#[must_use]
pub fn advance(previous: Option<i64>) -> i64 {
    let now = now_millis();
    match previous {
        Some(prev) if prev >= now => prev.saturating_add(1),
        _ => now,
    }
}
