pub mod items;
pub mod run;

use chrono::DateTime;

/// Parse a `--since` value: epoch seconds or an RFC 3339 timestamp
pub fn parse_since(value: &str) -> Result<i64, String> {
    if let Ok(epoch) = value.parse::<i64>() {
        return Ok(epoch);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| format!("expected epoch seconds or an RFC 3339 timestamp: {}", e))
}
