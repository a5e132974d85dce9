//! Snowflake identifier helpers.
//!
//! Post ids issued since late 2010 embed their creation time in the upper
//! bits: `(id >> 22)` is milliseconds since the service epoch.

use chrono::{DateTime, Utc};

/// Service epoch (2010-11-04T01:42:54.657Z) in Unix milliseconds.
pub const SNOWFLAKE_EPOCH_MS: i64 = 1_288_834_974_657;

/// Smallest id treated as a snowflake. Anything lower is a legacy
/// sequential id with no embedded timestamp.
pub const MIN_SNOWFLAKE_ID: u64 = 292_000_000_000_001;

/// Whether `id` carries an embedded timestamp.
pub fn is_snowflake(id: u64) -> bool {
    id >= MIN_SNOWFLAKE_ID
}

/// Creation time of a snowflake id in Unix milliseconds.
pub fn snowflake_to_utc_ms(id: u64) -> i64 {
    // id >> 22 is at most 2^42, always representable
    (id >> 22) as i64 + SNOWFLAKE_EPOCH_MS
}

/// Creation time of a snowflake id.
pub fn snowflake_to_datetime(id: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(snowflake_to_utc_ms(id))
}

/// Render a Unix-millisecond timestamp the way the export table shows it.
pub fn format_utc_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_default()
}
