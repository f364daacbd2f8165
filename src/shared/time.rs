use chrono::{Local, NaiveDateTime};

/// Wall-clock "now" in the feed's zoneless local convention.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses a feed timestamp. The wire format is zoneless local ISO-8601
/// (`2025-12-01T14:30:00`), but some operators append a literal `Z`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');
    trimmed.parse::<NaiveDateTime>().ok()
}

/// Delay in whole minutes between the expected and the scheduled arrival,
/// rounded to the nearest minute. Negative means the vehicle runs early.
/// `None` when either side is missing or unparsable, which is distinct
/// from a delay of zero.
pub fn delay(expected: Option<&str>, target: Option<&str>) -> Option<i64> {
    let expected = parse_timestamp(expected?)?;
    let target = parse_timestamp(target?)?;
    let seconds = (expected - target).num_seconds();
    Some(round_to_minutes(seconds))
}

/// Whole minutes from `now` until `timestamp`, truncated toward zero and
/// clamped at 0. A vehicle that should already have left reports 0.
pub fn minutes_until(timestamp: Option<&str>, now: NaiveDateTime) -> Option<i64> {
    let departure = parse_timestamp(timestamp?)?;
    let minutes = (departure - now).num_seconds() / 60;
    Some(minutes.max(0))
}

/// Minutes left before one has to start walking to catch the vehicle.
pub fn time_to_leave(minutes_until_departure: i64, walking_minutes: i64) -> i64 {
    (minutes_until_departure - walking_minutes).max(0)
}

fn round_to_minutes(seconds: i64) -> i64 {
    if seconds >= 0 {
        (seconds + 30) / 60
    } else {
        (seconds - 30) / 60
    }
}

#[test]
fn parse_plain() {
    assert!(parse_timestamp("2025-12-01T14:30:00").is_some());
}

#[test]
fn parse_utc_marker() {
    let plain = parse_timestamp("2025-12-01T14:30:00").unwrap();
    let marked = parse_timestamp("2025-12-01T14:30:00Z").unwrap();
    assert_eq!(plain, marked);
}

#[test]
fn parse_garbage() {
    assert!(parse_timestamp("14:30").is_none());
}

#[test]
fn round_half_up() {
    assert_eq!(round_to_minutes(90), 2);
    assert_eq!(round_to_minutes(89), 1);
    assert_eq!(round_to_minutes(-90), -2);
    assert_eq!(round_to_minutes(-89), -1);
}
