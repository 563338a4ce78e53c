use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::model::Instant;

// ── Local calendar helpers ────────────────────────────────────────

/// Step used to walk out of a DST gap, and how many steps to try.
const GAP_STEP_MINUTES: i64 = 15;
const MAX_GAP_STEPS: u32 = 16;

/// Map a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fold) take the earliest mapping. Times inside a DST
/// gap move forward to the first wall time that exists.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Instant {
    let mut wall = local;
    for _ in 0..=MAX_GAP_STEPS {
        if let Some(dt) = tz.from_local_datetime(&wall).earliest() {
            return dt.with_timezone(&Utc);
        }
        wall += TimeDelta::minutes(GAP_STEP_MINUTES);
    }
    local.and_utc()
}

pub fn local_date<Tz: TimeZone>(tz: &Tz, t: &Instant) -> NaiveDate {
    t.with_timezone(tz).date_naive()
}

/// Weekday of `t` in `tz`, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index<Tz: TimeZone>(tz: &Tz, t: &Instant) -> usize {
    t.with_timezone(tz).weekday().num_days_from_sunday() as usize
}

/// 00:00:00.000 of `date`.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Instant {
    resolve_local(tz, date.and_time(NaiveTime::default()))
}

/// 23:59:59.999 of `date`.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Instant {
    let last_ms = NaiveTime::default() - TimeDelta::milliseconds(1);
    resolve_local(tz, date.and_time(last_ms))
}

/// Days from `date` to the Sunday closing its week (0 when `date` is Sunday).
pub fn days_until_sunday(date: NaiveDate) -> u64 {
    u64::from((7 - date.weekday().num_days_from_sunday()) % 7)
}

/// Timestamps carrying an offset (`Z`, `+01`, `+01:00`, `+0100`).
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Wall times read in the calendar zone.
const WALL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date-like query value.
///
/// Accepts ISO 8601 timestamps with an offset, at second or minute
/// precision and with `T` or a space between date and time. Values without
/// an offset, including bare `YYYY-MM-DD` dates, are read in `tz`.
pub fn parse_instant<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<Instant> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = WALL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(resolve_local(tz, naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| start_of_day(tz, date))
}
