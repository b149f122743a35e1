//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 text with fixed microsecond precision and a
//! `Z` suffix, so string order in SQL equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn from_db(s: &str) -> crate::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| crate::Error::Internal(format!("Failed to parse timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_format_round_trips() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let stored = to_db(&ts);
        assert_eq!(stored, "2025-03-14T09:00:00.000000Z");
        assert_eq!(from_db(&stored).unwrap(), ts);
    }

    #[test]
    fn test_storage_format_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 10, 2, 3, 4, 5).unwrap();
        assert!(to_db(&early) < to_db(&late));
    }

    #[test]
    fn test_from_db_rejects_garbage() {
        assert!(from_db("yesterday").is_err());
    }
}
