//! Issue date parsing for receipt headers.

use chrono::{NaiveDate, NaiveDateTime};

use super::patterns::GLUED_DATETIME;

/// Date+time formats tried first, in order.
const DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%y %H:%M:%S", // 03-09-24 10:53:31
    "%d/%m/%y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only formats; time defaults to midnight.
const DATE_FORMATS: &[&str] = &["%d-%m-%y", "%d/%m/%y", "%d-%m-%Y", "%d/%m/%Y"];

/// ISO-like orderings, tried last.
const ISO_DATETIME_FORMATS: &[&str] = &["%y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a receipt issue date, tolerating the date and time being glued
/// together with no separator (common in OCR output).
///
/// The first format that parses the whole token wins; failures across
/// all formats yield `None`.
pub fn parse_issue_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = normalize_glued(text.trim());

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt);
        }
    }

    None
}

/// Split a glued date+time substring into `"<date> <time>"`.
fn normalize_glued(text: &str) -> String {
    for pattern in GLUED_DATETIME.iter() {
        if let Some(caps) = pattern.captures(text) {
            return format!("{} {}", &caps[1], &caps[2]);
        }
    }
    text.to_string()
}
