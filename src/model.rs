use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// UTC instant. Calendar questions (midnight, weekday) are answered in a
/// separate calendar zone, never in this type.
pub type Instant = DateTime<Utc>;

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Instant,
    pub end: Instant,
}

impl TimeRange {
    pub fn new(start: Instant, end: Instant) -> Self {
        debug_assert!(start <= end, "TimeRange start must not be after end");
        Self { start, end }
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_range(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One calendar-week-aligned piece of a query range.
pub type WeekWindow = TimeRange;

/// Result of partitioning a query range into weeks.
///
/// `start` is midnight of the first day and `end` the last millisecond of the
/// last day, both in the calendar zone used for the partition. `weeks` is
/// chronological and contiguous: each window ends where the next begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBounds {
    pub start: Instant,
    pub end: Instant,
    pub weeks: Vec<WeekWindow>,
}

// ── Bookings ──────────────────────────────────────────────────────

/// The occupied interval of one reservation.
///
/// `end` is not required to follow `start`; durations are taken as absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BookingWire")]
pub struct Booking {
    pub start: Instant,
    pub end: Instant,
}

impl Booking {
    pub fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_milliseconds().abs() as f64 / MS_PER_HOUR
    }
}

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Bookings arrive either flat or in the transaction-include shape with the
/// times nested under `attributes`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BookingWire {
    Nested { attributes: BookingTimes },
    Flat(BookingTimes),
}

#[derive(Deserialize)]
struct BookingTimes {
    start: Instant,
    end: Instant,
}

impl From<BookingWire> for Booking {
    fn from(wire: BookingWire) -> Self {
        let (BookingWire::Nested { attributes: t } | BookingWire::Flat(t)) = wire;
        Booking::new(t.start, t.end)
    }
}

// ── Limitations ───────────────────────────────────────────────────

/// Per-listing booking caps. `None` on an axis means no limit on that axis.
///
/// Values come from a free-text form, so numbers may arrive as strings.
/// Anything that does not read as a number is treated as no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitationConfig {
    #[serde(default, deserialize_with = "lenient_limit")]
    pub hours_per_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub number_per_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_limit")]
    pub number_per_week: Option<f64>,
}

impl LimitationConfig {
    /// What the edit form stores when "accept all" is chosen.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// True when every axis is unset or zero.
    pub fn is_unlimited(&self) -> bool {
        [self.hours_per_day, self.number_per_day, self.number_per_week]
            .into_iter()
            .all(|v| v.is_none_or(|n| n == 0.0))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawLimit>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawLimit::Number(n)) if n.is_finite() => Some(n),
        Some(RawLimit::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Some(RawLimit::Number(_) | RawLimit::Other(IgnoredAny)) | None => None,
    })
}

// ── Listings ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ListingIdWire")]
pub struct ListingId {
    pub uuid: Uuid,
}

impl ListingId {
    pub fn new(uuid: Uuid) -> Self {
        Self { uuid }
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingIdWire {
    Wrapped { uuid: Uuid },
    Plain(Uuid),
}

impl From<ListingIdWire> for ListingId {
    fn from(wire: ListingIdWire) -> Self {
        let (ListingIdWire::Wrapped { uuid } | ListingIdWire::Plain(uuid)) = wire;
        ListingId { uuid }
    }
}

/// A marketplace listing. Only the limitation config is interpreted; every
/// other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub attributes: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn new(id: ListingId, attributes: Value) -> Self {
        Self {
            id,
            attributes,
            extra: Map::new(),
        }
    }

    /// `attributes.publicData.bookingLimitations`, or `None` when absent or
    /// not an object.
    pub fn limitations(&self) -> Option<LimitationConfig> {
        match self.attributes.pointer("/publicData/bookingLimitations") {
            Some(v @ Value::Object(_)) => LimitationConfig::deserialize(v).ok(),
            _ => None,
        }
    }
}

// ── Requests ──────────────────────────────────────────────────────

/// Caller-supplied query bounds, as received. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateQuery {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Both bounds present and non-blank.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.start) && present(&self.end)
    }
}

/// Input document for the `weekcap` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub query: DateQuery,
    pub listings: Vec<Listing>,
    /// Bookings per listing uuid.
    #[serde(default)]
    pub bookings: HashMap<Uuid, Vec<Booking>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterResponse {
    pub data: Vec<Listing>,
}
