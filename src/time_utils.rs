// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time formatted as RFC3339.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Whole seconds from an RFC3339 timestamp to `now`.
///
/// Unparseable or future timestamps count as zero elapsed time.
pub fn seconds_since(start: &str, now: DateTime<Utc>) -> u64 {
    DateTime::parse_from_rfc3339(start)
        .map(|start| {
            now.signed_duration_since(start.with_timezone(&Utc))
                .num_seconds()
                .max(0) as u64
        })
        .unwrap_or(0)
}
