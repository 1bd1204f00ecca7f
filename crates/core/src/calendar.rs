//! Calendar helpers for `YYYY-MM-DD` keys.
//!
//! Keys are compared as strings throughout the cache, which is only sound for
//! zero-padded dates; [`parse_ymd`] rejects anything else.

use std::sync::LazyLock;

use chrono::{Days, FixedOffset, NaiveDate, Utc};
use regex::Regex;

use crate::Error;

/// Upper bound used for forward-only invalidation.
pub const FAR_FUTURE: &str = "9999-12-31";

static YMD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern"));

/// Parse a strict, zero-padded `YYYY-MM-DD` date.
pub fn parse_ymd(s: &str) -> Result<NaiveDate, Error> {
    let s = s.trim();
    if !YMD.is_match(s) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn format_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date at a fixed UTC offset (the reader runs on KST, +9).
pub fn today_at_offset(offset_hours: i32) -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(offset_hours.saturating_mul(3600)) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => {
            tracing::warn!(offset_hours, "invalid utc offset, using UTC");
            now.date_naive()
        }
    }
}

/// Whole days from `selected` to `today` (negative for future dates).
pub fn days_ago(selected: NaiveDate, today: NaiveDate) -> i64 {
    (today - selected).num_days()
}

/// `date - days`, saturating at the minimum representable date.
pub fn subtract_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN)
}

/// Every date in `[start, end]`. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
