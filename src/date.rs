//! Daily folder name recognition and rendering.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// Length of a `YYYY-MM-DD` name
const NAME_LEN: usize = 10;

/// Byte offsets of the two hyphens in a `YYYY-MM-DD` name
const SEPARATORS: [usize; 2] = [4, 7];

/// Check whether a folder name encodes a date as `YYYY-MM-DD`.
///
/// The check is purely lexical: only ASCII digits are accepted and month/day
/// ranges are not validated, so `2099-99-99` matches.
pub fn is_daily_folder_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() != NAME_LEN {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| {
        if SEPARATORS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_digit()
        }
    })
}

/// Render a date as a daily folder name (zero padded `YYYY-MM-DD`)
pub fn today_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The current date in the local time zone
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` string into a calendar date
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let date_str = date_str.trim();
    // chrono accepts unpadded fields, folder names must not
    if !is_daily_folder_name(date_str) {
        anyhow::bail!(
            "Invalid date format. Expected YYYY-MM-DD, got: {}",
            date_str
        );
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Not a calendar date: {}", date_str))
}
