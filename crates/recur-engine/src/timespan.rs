//! Time-span primitives shared by the cursor, the factory and the facades.
//!
//! Every instant in this crate is a `DateTime<Utc>`. Sources carry their own
//! start and end; the factory derives a fixed [`Duration`] from them once and
//! stamps it onto every [`Timeframe`] it computes.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecurError;

/// A concrete `[start, end)` window computed for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
}

impl Timeframe {
    /// A timeframe beginning at `start` and lasting `duration`.
    ///
    /// `None` when the end falls outside chrono's representable range.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        let end = start.checked_add_signed(duration)?;
        Some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Anything the factory can expand: a start, an end, and optional rule lines.
///
/// `Clone` is required because every emitted occurrence is produced from a
/// fresh clone of the source template.
pub trait SpanSource: Clone {
    fn start(&self) -> DateTime<Utc>;

    fn end(&self) -> DateTime<Utc>;

    /// Raw recurrence lines (`RRULE:...`, `EXDATE:...`, ...). Empty when the
    /// source does not repeat.
    fn recurrence(&self) -> &[String];

    fn timeframe(&self) -> Timeframe {
        Timeframe {
            start: self.start(),
            end: self.end(),
        }
    }
}

// ── Conversion helpers ──────────────────────────────────────────────────────

/// Parse an RFC 3339 string into a UTC instant.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, RecurError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RecurError::InvalidDatetime(format!("'{}': {}", s, e)))
}

/// Format an instant the way occurrences are serialized (millisecond precision, `Z`).
pub fn format_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch, the unit used in composite occurrence ids.
pub fn to_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Inverse of [`to_millis`]. `None` when the value is outside chrono's range.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Compact iCalendar UTC form used for `DTSTART` lines, e.g. `20240101T100000Z`.
///
/// Sub-second precision is dropped; recurrence rules operate on whole seconds.
/// See [`subsecond_offset`] for the part that is cut off.
pub fn format_ical_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// How far `dt` lies past its whole second.
pub fn subsecond_offset(dt: &DateTime<Utc>) -> Duration {
    Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timeframe_starting_at() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let tf = Timeframe::starting_at(start, Duration::hours(1)).unwrap();
        assert_eq!(tf.end, Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
        assert_eq!(tf.duration(), Duration::hours(1));
    }

    #[test]
    fn test_timeframe_end_past_range_is_none() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);
        assert_eq!(Timeframe::starting_at(late, Duration::hours(1)), None);
        assert!(Timeframe::starting_at(late, Duration::minutes(30)).is_some());
    }

    #[test]
    fn test_parse_rfc3339_normalizes_offset() {
        let dt = parse_rfc3339("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_rejects_garbage() {
        let err = parse_rfc3339("next tuesday").unwrap_err();
        assert!(matches!(err, RecurError::InvalidDatetime(_)));
    }

    #[test]
    fn test_millis_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap();
        assert_eq!(to_millis(&dt), 1_704_708_000_000);
        assert_eq!(from_millis(1_704_708_000_000), Some(dt));
    }

    #[test]
    fn test_from_millis_out_of_range() {
        assert_eq!(from_millis(i64::MAX), None);
    }

    #[test]
    fn test_format_ical_utc_drops_subseconds() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::milliseconds(250);
        assert_eq!(format_ical_utc(&dt), "20240101T100000Z");
        assert_eq!(subsecond_offset(&dt), Duration::milliseconds(250));
    }

    #[test]
    fn test_timeframe_serializes_with_date_keys() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let tf = Timeframe::starting_at(start, Duration::hours(1)).unwrap();
        let json = serde_json::to_value(tf).unwrap();
        assert!(json.get("startDate").is_some());
        assert!(json.get("endDate").is_some());
    }
}
