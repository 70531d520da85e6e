// Time and identity primitives shared by every module.
//
// Purpose
// - Parse the loose timestamp shapes found in stored and imported records.
// - Minute arithmetic and grid snapping used by the store and the calendar.
//
// Boundaries
// - Pure functions. No clock reads except in `generate_id`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60_000;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A timestamp as it appears in raw records: either text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            RawTimestamp::Text(text) => parse_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        RawTimestamp::Text(value.to_rfc3339())
    }
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and bare dates.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rounds to the nearest multiple of `minutes`, halves rounding up.
pub fn snap_to_minutes(at: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    if minutes <= 0 {
        return at;
    }
    let Some(step) = minutes.checked_mul(MILLIS_PER_MINUTE) else {
        return at;
    };
    let ms = at.timestamp_millis();
    let remainder = ms.rem_euclid(step);
    let snapped = if remainder >= step - remainder {
        (ms - remainder).checked_add(step)
    } else {
        Some(ms - remainder)
    };
    snapped
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(at)
}

/// `None` when the result falls outside the representable range.
pub fn add_minutes(at: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Whole minutes from `start` to `end`, rounded, never negative.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    (ms + MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE
}

pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod primitives_tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, s).unwrap()
    }

    #[rstest]
    #[case("2024-03-04T10:15:00Z", Some(at(10, 15, 0)))]
    #[case("2024-03-04T11:15:00+01:00", Some(at(10, 15, 0)))]
    #[case("2024-03-04T10:15", Some(at(10, 15, 0)))]
    #[case("2024-03-04 10:15:30", Some(at(10, 15, 30)))]
    #[case("2024-03-04", Some(at(0, 0, 0)))]
    #[case("   ", None)]
    #[case("not a date", None)]
    fn it_should_parse_the_supported_timestamp_shapes(
        #[case] input: &str,
        #[case] expected: Option<DateTime<Utc>>,
    ) {
        assert_eq!(parse_timestamp(input), expected);
    }

    #[rstest]
    fn it_should_parse_epoch_millis() {
        let raw = RawTimestamp::Millis(at(10, 0, 0).timestamp_millis());
        assert_eq!(raw.parse(), Some(at(10, 0, 0)));
    }

    #[rstest]
    #[case(at(10, 7, 29), at(10, 0, 0))]
    #[case(at(10, 7, 30), at(10, 15, 0))]
    #[case(at(10, 52, 0), at(10, 45, 0))]
    #[case(at(10, 53, 0), at(11, 0, 0))]
    fn it_should_snap_to_the_nearest_quarter_hour(
        #[case] input: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(snap_to_minutes(input, 15), expected);
    }

    #[rstest]
    #[case(at(10, 0, 0), at(10, 45, 0), 45)]
    #[case(at(10, 0, 0), at(10, 0, 31), 1)]
    #[case(at(10, 0, 0), at(10, 0, 29), 0)]
    #[case(at(11, 0, 0), at(10, 0, 0), 0)]
    fn it_should_count_rounded_minutes(
        #[case] start: DateTime<Utc>,
        #[case] end: DateTime<Utc>,
        #[case] expected: i64,
    ) {
        assert_eq!(minutes_between(start, end), expected);
    }

    #[rstest]
    fn it_should_add_minutes_within_range() {
        assert_eq!(add_minutes(at(10, 0, 0), 45), Some(at(10, 45, 0)));
        assert_eq!(add_minutes(at(10, 0, 0), -60), Some(at(9, 0, 0)));
    }

    #[rstest]
    #[case(i64::MAX)]
    #[case(i64::MIN)]
    #[case(i64::MAX / MILLIS_PER_MINUTE)]
    fn it_should_refuse_minute_offsets_outside_the_calendar(#[case] minutes: i64) {
        assert_eq!(add_minutes(at(10, 0, 0), minutes), None);
    }

    #[rstest]
    fn it_should_leave_the_time_alone_when_the_grid_step_overflows() {
        assert_eq!(snap_to_minutes(at(10, 7, 0), i64::MAX), at(10, 7, 0));
    }

    #[rstest]
    fn it_should_generate_unique_ids() {
        assert_ne!(generate_id(), generate_id());
    }
}
