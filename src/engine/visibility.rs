use chrono::TimeZone;
use tracing::debug;

use crate::model::*;

use super::limits::is_week_valid;
use super::weeks::bookings_in;

/// Whether `listing` stays visible for the partitioned range.
///
/// `bookings` should already be limited to the query range.
pub fn is_visible<Tz: TimeZone>(
    listing: &Listing,
    bookings: &[Booking],
    bounds: &WeekBounds,
    tz: &Tz,
) -> bool {
    let limits = listing.limitations();
    let visible = is_visible_with(limits.as_ref(), bookings, bounds, tz);
    debug!(listing = %listing.id, visible, bookings = bookings.len(), "visibility decided");
    visible
}

/// Visibility for a bare limitation config.
///
/// A single week with capacity left is enough. Weeks with no bookings are
/// open. A range with no weeks at all cannot hold bookings and is visible.
pub fn is_visible_with<Tz: TimeZone>(
    limits: Option<&LimitationConfig>,
    bookings: &[Booking],
    bounds: &WeekBounds,
    tz: &Tz,
) -> bool {
    let Some(limits) = limits.filter(|l| !l.is_unlimited()) else {
        return true;
    };
    if bounds.weeks.is_empty() {
        return true;
    }

    bounds.weeks.iter().any(|week| {
        let week_bookings = bookings_in(bookings, week);
        let open = week_bookings.is_empty() || is_week_valid(&week_bookings, Some(limits), tz);
        debug!(
            week_start = %week.start,
            week_end = %week.end,
            bookings = week_bookings.len(),
            open,
            "week judged"
        );
        open
    })
}
