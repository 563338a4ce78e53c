use chrono::{FixedOffset, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::model::*;

// Three calendar weeks: Mon 2024-01-01 .. Sun 2024-01-21.
fn three_weeks() -> WeekBounds {
    partition(day(1), day(21), false, &Utc)
}

fn day(d: u32) -> Instant {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn span(d: u32, from: (u32, u32), to: (u32, u32)) -> Booking {
    Booking::new(
        Utc.with_ymd_and_hms(2024, 1, d, from.0, from.1, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, d, to.0, to.1, 0).unwrap(),
    )
}

fn listing_with(limits: serde_json::Value) -> Listing {
    Listing::new(
        ListingId::new(Uuid::new_v4()),
        json!({"title": "Consultation", "publicData": {"bookingLimitations": limits}}),
    )
}

// ── Weekly cap across a multi-week range ─────────────────────────

#[test]
fn weekly_cap_with_one_exhausted_week() {
    let bounds = three_weeks();
    assert_eq!(bounds.weeks.len(), 3);

    let listing = listing_with(json!({"hoursPerDay": null, "numberPerDay": null, "numberPerWeek": 2}));
    let bookings = [
        // week 1: over the cap
        span(2, (9, 0), (10, 0)),
        span(3, (9, 0), (10, 0)),
        span(4, (9, 0), (10, 0)),
        // week 2: exactly at the cap
        span(9, (9, 0), (10, 0)),
        span(10, (9, 0), (10, 0)),
        // week 3: empty
    ];

    let limits = listing.limitations().unwrap();
    let verdicts: Vec<bool> = bounds
        .weeks
        .iter()
        .map(|w| {
            let in_week = bookings_in(&bookings, w);
            in_week.is_empty() || is_week_valid(&in_week, Some(&limits), &Utc)
        })
        .collect();
    assert_eq!(verdicts, vec![false, true, true]);
    assert!(is_visible(&listing, &bookings, &bounds, &Utc));
}

#[test]
fn weekly_cap_exhausted_everywhere() {
    let bounds = three_weeks();
    let listing = listing_with(json!({"numberPerWeek": 2}));
    let bookings: Vec<Booking> = [2, 3, 4, 9, 10, 11, 16, 17, 18]
        .into_iter()
        .map(|d| span(d, (9, 0), (10, 0)))
        .collect();
    assert!(!is_visible(&listing, &bookings, &bounds, &Utc));
}

// ── Hours per day ─────────────────────────────────────────────────

#[test]
fn single_day_over_hour_cap_closes_week() {
    let limits = LimitationConfig {
        hours_per_day: Some(4.0),
        ..LimitationConfig::unlimited()
    };
    let week1 = [span(2, (9, 0), (11, 30)), span(2, (13, 0), (15, 30))];
    let check = WeekCheck::evaluate(&week1, &limits, &Utc);
    assert!(check.hours_per_day_exceeded);
    assert!(!check.is_valid());
}

#[test]
fn hour_cap_exceeded_in_every_week_hides() {
    let bounds = three_weeks();
    let listing = listing_with(json!({"hoursPerDay": "4"}));
    let bookings = [
        span(2, (9, 0), (11, 30)),
        span(2, (13, 0), (15, 30)),
        span(10, (8, 0), (13, 0)),
        span(16, (8, 0), (12, 30)),
        span(18, (8, 0), (18, 0)),
    ];
    assert!(!is_visible(&listing, &bookings, &bounds, &Utc));

    // One lighter day in week 3 reopens that week.
    let mut lighter = bookings.to_vec();
    lighter.push(span(19, (9, 0), (10, 0)));
    assert!(is_visible(&listing, &lighter, &bounds, &Utc));
}

// ── Week boundaries ───────────────────────────────────────────────

#[test]
fn straddling_booking_counts_nowhere() {
    let bounds = three_weeks();
    let listing = listing_with(json!({"numberPerWeek": 0.5}));
    // Sunday night into Monday morning, across the week 1/2 boundary.
    let straddler = Booking::new(
        Utc.with_ymd_and_hms(2024, 1, 7, 22, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 8, 2, 0, 0).unwrap(),
    );
    for week in &bounds.weeks {
        assert!(bookings_in(&[straddler], week).is_empty());
    }
    // Weeks 2 and 3 are full on their own; the straddler cannot tip week 1.
    let bookings = [straddler, span(9, (9, 0), (10, 0)), span(16, (9, 0), (10, 0))];
    assert!(is_visible(&listing, &bookings, &bounds, &Utc));
}

#[test]
fn calendar_zone_moves_bookings_between_weeks() {
    // Sunday 23:00 UTC is Monday 01:00 at +02:00: week 2 in that calendar.
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let late_sunday = Booking::new(
        Utc.with_ymd_and_hms(2024, 1, 7, 23, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 7, 23, 30, 0).unwrap(),
    );
    let utc_bounds = partition(day(1), day(14), false, &Utc);
    let local_bounds = partition(
        tz.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().with_timezone(&Utc),
        tz.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap().with_timezone(&Utc),
        false,
        &tz,
    );
    assert_eq!(bookings_in(&[late_sunday], &utc_bounds.weeks[0]).len(), 1);
    assert!(bookings_in(&[late_sunday], &local_bounds.weeks[0]).is_empty());
    assert_eq!(bookings_in(&[late_sunday], &local_bounds.weeks[1]).len(), 1);
}

#[test]
fn unlimited_listing_ignores_bookings() {
    let bounds = three_weeks();
    let listing = listing_with(json!({"hoursPerDay": null, "numberPerDay": null, "numberPerWeek": null}));
    let bookings: Vec<Booking> = (1..=21).map(|d| span(d, (0, 0), (23, 0))).collect();
    assert!(is_visible(&listing, &bookings, &bounds, &Utc));
}
