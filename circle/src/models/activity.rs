//! Activity model

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::errors::{CircleError, Result};

/// Pattern of activity ids, which are UTC timestamps
pub const ACTIVITY_ID_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A recorded motion event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    /// Backend id, also the event's UTC timestamp
    pub activity_id: String,

    /// When the event happened, in the zone the caller asked in
    pub activity_time: DateTime<FixedOffset>,

    /// Accessory that recorded it
    pub accessory_id: String,
}

impl Activity {
    /// File name for the activity's video, e.g. `20240131T184502-0800.mp4`
    pub fn video_file_name(&self) -> String {
        format!("{}.mp4", self.activity_time.format("%Y%m%dT%H%M%S%z"))
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.activity_id, self.activity_time)
    }
}

/// Format a point in time as an activity id / page cursor
pub fn format_activity_id<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    time.with_timezone(&Utc).format(ACTIVITY_ID_FORMAT).to_string()
}

/// Parse an activity id into its UTC timestamp
pub fn parse_activity_id(id: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(id, ACTIVITY_ID_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| CircleError::InvalidActivityId(id.to_string()))
}

/// Drop seconds and sub-seconds
pub fn truncate_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_activity_id() {
        let time = parse_activity_id("20240131T184502Z").unwrap();
        assert_eq!(time, Utc.with_ymd_and_hms(2024, 1, 31, 18, 45, 2).unwrap());
    }

    #[test]
    fn test_format_converts_to_utc() {
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let time = pacific.with_ymd_and_hms(2024, 1, 31, 10, 45, 2).unwrap();
        assert_eq!(format_activity_id(&time), "20240131T184502Z");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for id in ["", "2024-01-31T18:45:02Z", "20240131T184502", "20241331T000000Z"] {
            assert!(
                matches!(parse_activity_id(id), Err(CircleError::InvalidActivityId(_))),
                "{id} should not parse"
            );
        }
    }

    #[test]
    fn test_truncate_to_minute() {
        let time = Utc.with_ymd_and_hms(2024, 1, 31, 18, 45, 59).unwrap();
        assert_eq!(
            truncate_to_minute(time),
            Utc.with_ymd_and_hms(2024, 1, 31, 18, 45, 0).unwrap()
        );
    }

    #[test]
    fn test_video_file_name() {
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let activity = Activity {
            activity_id: "20240131T184502Z".to_string(),
            activity_time: parse_activity_id("20240131T184502Z")
                .unwrap()
                .with_timezone(&pacific),
            accessory_id: "cam".to_string(),
        };
        assert_eq!(activity.video_file_name(), "20240131T104502-0800.mp4");
        assert_eq!(
            activity.to_string(),
            "20240131T184502Z (2024-01-31 10:45:02 -08:00)"
        );
    }
}
