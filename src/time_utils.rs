// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-year math and date formatting.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// January 1, 00:00:00 UTC of the given year.
fn new_year(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Start of the calendar year containing `now` (UTC).
pub fn start_of_year(now: DateTime<Utc>) -> DateTime<Utc> {
    new_year(now.year())
}

/// Start of the calendar year following `now` (UTC).
pub fn start_of_next_year(now: DateTime<Utc>) -> DateTime<Utc> {
    new_year(now.year() + 1)
}

/// Whole days remaining in the year, not counting the current one.
///
/// `floor(hours_until_next_jan_1 / 24) - 1`, so it is `-1` during the last
/// day of the year.
pub fn days_left_in_year(now: DateTime<Utc>) -> i64 {
    let remaining = (start_of_next_year(now) - now).num_seconds();
    remaining.div_euclid(SECONDS_PER_DAY) - 1
}
