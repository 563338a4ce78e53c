use chrono::{Days, TimeZone};

use crate::model::*;

use super::calendar::{days_until_sunday, end_of_day, local_date, start_of_day};

// ── Week partition ────────────────────────────────────────────────

/// Split `[query_start, query_end]` into calendar weeks of `tz`.
///
/// The range is widened to whole days: midnight of the first day through
/// 23:59:59.999 of the last. With `exclude_end` the last day is the one
/// before `query_end`'s date. Weeks close on Sunday 23:59:59.999; the first
/// window runs from `start` to the first Sunday, the last one is cut at `end`.
///
/// Adjacent windows share their boundary instant. If the normalized end is
/// not after the normalized start there are no windows.
pub fn partition<Tz: TimeZone>(
    query_start: Instant,
    query_end: Instant,
    exclude_end: bool,
    tz: &Tz,
) -> WeekBounds {
    let start_date = local_date(tz, &query_start);
    let mut end_date = local_date(tz, &query_end);
    if exclude_end {
        end_date = end_date.pred_opt().unwrap_or(end_date);
    }

    let start = start_of_day(tz, start_date);
    let end = end_of_day(tz, end_date);

    let mut breakpoints = vec![start];
    if start < end {
        let mut sunday = start_date.checked_add_days(Days::new(days_until_sunday(start_date)));
        while let Some(day) = sunday {
            let boundary = end_of_day(tz, day);
            if boundary >= end {
                break;
            }
            breakpoints.push(boundary);
            sunday = day.checked_add_days(Days::new(7));
        }
        breakpoints.push(end);
    }

    let weeks = breakpoints
        .windows(2)
        .map(|pair| TimeRange::new(pair[0], pair[1]))
        .collect();

    WeekBounds { start, end, weeks }
}

// ── Range membership ──────────────────────────────────────────────

/// True iff `[range_start, range_end]` lies entirely inside
/// `[window_start, window_end]`. Overlap alone is not enough.
pub fn in_range(
    range_start: Instant,
    range_end: Instant,
    window_start: Instant,
    window_end: Instant,
) -> bool {
    let window = TimeRange {
        start: window_start,
        end: window_end,
    };
    window.contains_range(&TimeRange {
        start: range_start,
        end: range_end,
    })
}

impl Booking {
    pub fn within(&self, window: &TimeRange) -> bool {
        in_range(self.start, self.end, window.start, window.end)
    }
}

impl WeekBounds {
    /// True if the booking lies entirely inside the normalized query range.
    pub fn contains(&self, booking: &Booking) -> bool {
        in_range(booking.start, booking.end, self.start, self.end)
    }
}

/// Bookings fully contained in `window`. A booking that straddles the
/// window edge belongs to neither side.
pub fn bookings_in(bookings: &[Booking], window: &WeekWindow) -> Vec<Booking> {
    bookings.iter().filter(|b| b.within(window)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Timelike, Utc, Weekday};
    use chrono_tz::Europe::Berlin;

    fn day(d: u32) -> Instant {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> Instant {
        Utc.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
    }

    fn eod(d: u32) -> Instant {
        end_of_day(&Utc, day(d).date_naive())
    }

    #[test]
    fn three_calendar_weeks() {
        // 2024-01-01 is a Monday, 2024-01-21 a Sunday.
        let bounds = partition(day(1), day(21), false, &Utc);
        assert_eq!(bounds.start, day(1));
        assert_eq!(bounds.end, eod(21));
        assert_eq!(
            bounds.weeks,
            vec![
                TimeRange::new(day(1), eod(7)),
                TimeRange::new(eod(7), eod(14)),
                TimeRange::new(eod(14), eod(21)),
            ]
        );
    }

    #[test]
    fn time_of_day_is_ignored() {
        let bounds = partition(at(3, 15, 30), at(10, 8, 0), false, &Utc);
        assert_eq!(bounds.start, day(3));
        assert_eq!(bounds.end, eod(10));
        assert_eq!(bounds.weeks.len(), 2);
        assert_eq!(bounds.weeks[0], TimeRange::new(day(3), eod(7)));
        assert_eq!(bounds.weeks[1], TimeRange::new(eod(7), eod(10)));
    }

    #[test]
    fn exclude_end_drops_the_last_day() {
        let bounds = partition(day(1), day(8), true, &Utc);
        assert_eq!(bounds.end, eod(7));
        assert_eq!(bounds.weeks, vec![TimeRange::new(day(1), eod(7))]);
    }

    #[test]
    fn range_inside_one_week_is_cut_at_end() {
        let bounds = partition(day(1), day(3), false, &Utc);
        assert_eq!(bounds.weeks, vec![TimeRange::new(day(1), eod(3))]);
    }

    #[test]
    fn sunday_start_closes_the_same_day() {
        let bounds = partition(day(7), day(9), false, &Utc);
        assert_eq!(
            bounds.weeks,
            vec![TimeRange::new(day(7), eod(7)), TimeRange::new(eod(7), eod(9))]
        );
    }

    #[test]
    fn single_day_range() {
        let bounds = partition(day(2), day(2), false, &Utc);
        assert_eq!(bounds.weeks, vec![TimeRange::new(day(2), eod(2))]);
    }

    #[test]
    fn collapsed_range_has_no_weeks() {
        let bounds = partition(day(2), day(2), true, &Utc);
        assert!(bounds.end < bounds.start);
        assert!(bounds.weeks.is_empty());
    }

    #[test]
    fn partition_is_deterministic() {
        let a = partition(at(4, 11, 0), at(29, 18, 0), true, &Berlin);
        let b = partition(at(4, 11, 0), at(29, 18, 0), true, &Berlin);
        assert_eq!(a, b);
    }

    #[test]
    fn windows_are_contiguous_and_cover_the_range() {
        let zones: [FixedOffset; 3] = [
            FixedOffset::east_opt(0).unwrap(),
            FixedOffset::east_opt(9 * 3600).unwrap(),
            FixedOffset::west_opt(5 * 3600).unwrap(),
        ];
        for tz in &zones {
            for (s, e) in [(1, 31), (3, 4), (6, 20), (7, 28)] {
                let bounds = partition(day(s), day(e), false, tz);
                let weeks = &bounds.weeks;
                assert!(!weeks.is_empty());
                assert_eq!(weeks[0].start, bounds.start);
                assert_eq!(weeks[weeks.len() - 1].end, bounds.end);
                for pair in weeks.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                for w in &weeks[..weeks.len() - 1] {
                    let local = w.end.with_timezone(tz);
                    assert_eq!(local.weekday(), Weekday::Sun);
                    assert_eq!(local.hour(), 23);
                }
            }
        }
    }

    #[test]
    fn boundaries_stay_on_local_sundays_across_dst() {
        // Berlin switches to summer time on 2024-03-31.
        let start = Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 4, 12, 12, 0, 0).unwrap();
        let bounds = partition(start, end, false, &Berlin);
        assert_eq!(bounds.weeks.len(), 4);
        for w in &bounds.weeks[..3] {
            let local = w.end.with_timezone(&Berlin);
            assert_eq!(local.weekday(), Weekday::Sun);
            assert_eq!((local.hour(), local.minute()), (23, 59));
        }
        let first = bounds.start.with_timezone(&Berlin);
        assert_eq!((first.day(), first.hour()), (18, 0));
    }

    #[test]
    fn membership_requires_full_containment() {
        assert!(in_range(at(2, 9, 0), at(2, 10, 0), day(1), eod(7)));
        assert!(in_range(day(1), eod(7), day(1), eod(7)));
        assert!(!in_range(at(7, 22, 0), at(8, 1, 0), day(1), eod(7)));
        assert!(!in_range(at(7, 22, 0), at(8, 1, 0), eod(7), eod(14)));
    }

    #[test]
    fn straddling_booking_belongs_to_neither_week() {
        let bounds = partition(day(1), day(14), false, &Utc);
        let straddler = Booking::new(at(7, 22, 0), at(8, 1, 0));
        let inside = Booking::new(at(3, 9, 0), at(3, 10, 0));
        let bookings = [straddler, inside];
        assert_eq!(bookings_in(&bookings, &bounds.weeks[0]), vec![inside]);
        assert!(bookings_in(&bookings, &bounds.weeks[1]).is_empty());
        assert!(bounds.contains(&straddler));
    }
}
