//! Date helper functions
//!
//! Frontmatter dates stay strings end to end. These helpers parse them only
//! to order posts and to reformat them for display.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse a frontmatter date string in the common formats
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

/// Format a date string using a Moment.js-compatible format string
///
/// Unparseable input is returned unchanged.
///
/// # Examples
/// ```ignore
/// format_date("2024-01-15", "MMMM DD, YYYY") // -> "January 15, 2024"
/// ```
pub fn format_date(date: &str, format: &str) -> String {
    match parse_date(date) {
        Some(dt) => dt.format(&moment_to_chrono_format(format)).to_string(),
        None => date.to_string(),
    }
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DD", "%d"),
        // Time
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
