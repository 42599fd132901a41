//! Utility functions for date parsing, text shaping and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Flexible timestamp parsing for API dates
//! - Summary extraction from HTML post bodies
//! - String truncation for logs
//! - File system validation for the output directory

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use scraper::Html;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{Error, Result};

/// Formats that carry their own UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Date-time formats without an offset; interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a timestamp in any of the common ISO-8601 / RFC-2822 shapes.
///
/// Values without an offset are taken to be UTC. Anything that matches no
/// known shape is an [`Error::DateParse`]; there is no silent default.
///
/// # Examples
///
/// ```ignore
/// parse_date("2020-10-08T18:29:19.987936Z")?;
/// parse_date("Thu, 08 Oct 2020 18:29:19 +0000")?;
/// parse_date("2020-10-08")?;
/// ```
pub fn parse_date(input: &str) -> Result<DateTime<FixedOffset>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
        }
    }

    Err(Error::DateParse {
        input: input.to_string(),
    })
}

/// Plain text of an HTML fragment with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max_words` words of an HTML body, with an ellipsis when cut.
pub fn summarize(html: &str, max_words: usize) -> String {
    let text = html_to_text(html);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text
    } else {
        format!("{} …", words[..max_words].join(" "))
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a count
/// of the dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date_rfc3339() {
        let dt = parse_date("2020-10-08T18:29:19.987936Z").unwrap();
        assert_eq!(dt.year(), 2020);
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_date_rfc2822() {
        let dt = parse_date("Thu, 08 Oct 2020 18:29:19 +0200").unwrap();
        assert_eq!(dt.day(), 8);
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_parse_date_naive_variants_are_utc() {
        for input in [
            "2020-10-08T18:29:19",
            "2020-10-08 18:29:19",
            "2020-10-08 18:29",
            "2020/10/08 18:29:19",
        ] {
            let dt = parse_date(input).unwrap();
            assert_eq!((dt.month(), dt.day(), dt.hour()), (10, 8, 18), "{input}");
            assert_eq!(dt.offset().local_minus_utc(), 0, "{input}");
        }
    }

    #[test]
    fn test_parse_date_only() {
        for input in ["2020-03-01", "2020/03/01", "March 1, 2020", "1 March 2020", " 2020-03-01 "] {
            let dt = parse_date(input).unwrap();
            assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 3, 1), "{input}");
            assert_eq!(dt.hour(), 0);
        }
    }

    #[test]
    fn test_parse_date_with_offset() {
        let dt = parse_date("2020-10-08 18:29:19+0530").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("the day after tomorrow").unwrap_err();
        assert!(matches!(err, Error::DateParse { ref input } if input == "the day after tomorrow"));
    }

    #[test]
    fn test_html_to_text_collapses_whitespace() {
        let html = "<h2>Title</h2>\n<p>Some   <strong>bold</strong> text.</p>";
        assert_eq!(html_to_text(html), "Title Some bold text.");
    }

    #[test]
    fn test_summarize_cuts_long_bodies() {
        let html = "<p>one two three four five</p>";
        assert_eq!(summarize(html, 3), "one two three …");
        assert_eq!(summarize(html, 5), "one two three four five");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("ééé", 2);
        assert_eq!(result, "éé…(+2 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site/output");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
