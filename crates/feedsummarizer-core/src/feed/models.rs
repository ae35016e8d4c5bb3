use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Layout of an RSS `pubDate` once the weekday and zone tokens are removed
const PUB_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Zone names accepted as UTC in the trailing `%Z` position
const UTC_ZONES: &[&str] = &["GMT", "UTC", "UT", "Z"];

/// A single entry taken from the feed's channel
///
/// The publish time is not stored: it is derived from `pub_date` every time
/// it is asked for, so two items with the same `pub_date` always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub pub_date: String,
    pub link: String,
}

impl FeedItem {
    /// Publish time in UTC
    pub fn published_at(&self) -> Result<DateTime<Utc>> {
        parse_pub_date(&self.pub_date)
    }

    /// Publish time as seconds since the Unix epoch
    pub fn timestamp(&self) -> Result<i64> {
        self.published_at().map(|dt| dt.timestamp())
    }
}

/// Parse an RSS date such as `Mon, 01 Jan 2024 00:00:00 GMT`.
///
/// The weekday name is informational and never checked against the date.
/// Named zones must be a UTC designator. Numeric offsets (`+0200`) are
/// accepted through the RFC 2822 parser and normalized to UTC.
pub fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    let stamp = skip_weekday(raw);

    if let Some((stamp, zone)) = stamp.rsplit_once(' ') {
        if UTC_ZONES.iter().any(|z| z.eq_ignore_ascii_case(zone)) {
            return NaiveDateTime::parse_from_str(stamp.trim(), PUB_DATE_FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(|e| Error::FeedFormat(format!("Invalid pubDate '{}': {}", raw, e)));
        }
    }

    // RFC 2822 makes the day-of-week optional
    DateTime::parse_from_rfc2822(stamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::FeedFormat(format!("Invalid pubDate '{}': {}", raw, e)))
}

/// Drop a leading `Mon,` style token
fn skip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim_start(),
        _ => raw,
    }
}
