use std::time::Duration;

use chrono::{Local, TimeZone};
use futures::future::try_join_all;
use tracing::{error, info, warn};

use crate::model::*;
use crate::observability;
use crate::source::BookingSource;

use super::calendar::parse_instant;
use super::visibility::is_visible;
use super::weeks::partition;
use super::FilterError;

/// Drops listings whose booking limitations are exhausted in every week of
/// the query range.
///
/// Bookings for all listings are fetched concurrently and joined before any
/// filtering; one failed fetch fails the whole batch. Output keeps input order.
pub struct Filter<S, Tz: TimeZone = Local> {
    source: S,
    calendar: Tz,
    exclude_end: bool,
    fetch_timeout: Option<Duration>,
}

impl<S: BookingSource, Tz: TimeZone> Filter<S, Tz> {
    /// Query ends are treated as exclusive and fetches are not timed out.
    pub fn new(source: S, calendar: Tz) -> Self {
        Self {
            source,
            calendar,
            exclude_end: true,
            fetch_timeout: None,
        }
    }

    pub fn with_exclude_end(mut self, exclude_end: bool) -> Self {
        self.exclude_end = exclude_end;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Filter `listings` for a raw query.
    ///
    /// Without both a start and an end there is nothing to check against and
    /// every listing passes through unfiltered.
    pub async fn apply(
        &self,
        query: &DateQuery,
        listings: Vec<Listing>,
    ) -> Result<Vec<Listing>, FilterError> {
        let started = std::time::Instant::now();
        let result = self.apply_query(query, listings).await;
        metrics::counter!(
            observability::FILTER_REQUESTS_TOTAL,
            "outcome" => observability::outcome_label(&result)
        )
        .increment(1);
        metrics::histogram!(observability::FILTER_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        result
    }

    async fn apply_query(
        &self,
        query: &DateQuery,
        listings: Vec<Listing>,
    ) -> Result<Vec<Listing>, FilterError> {
        if !query.is_complete() {
            warn!(
                listings = listings.len(),
                "query range incomplete, skipping limitation filter"
            );
            return Ok(listings);
        }
        let start = self.parse_bound(query.start.as_deref())?;
        let end = self.parse_bound(query.end.as_deref())?;
        self.filter_by_limitations(start, end, listings).await
    }

    fn parse_bound(&self, raw: Option<&str>) -> Result<Instant, FilterError> {
        let raw = raw.unwrap_or_default();
        parse_instant(raw, &self.calendar).ok_or_else(|| FilterError::InvalidRange(raw.to_string()))
    }

    /// Keep the listings that still have an open week in `[start, end]`.
    pub async fn filter_by_limitations(
        &self,
        start: Instant,
        end: Instant,
        listings: Vec<Listing>,
    ) -> Result<Vec<Listing>, FilterError> {
        let bounds = partition(start, end, self.exclude_end, &self.calendar);
        let fetched = try_join_all(listings.iter().map(|listing| self.fetch(listing))).await?;

        let total = listings.len();
        let visible: Vec<Listing> = listings
            .into_iter()
            .zip(fetched)
            .filter_map(|(listing, bookings)| {
                let in_range: Vec<Booking> =
                    bookings.into_iter().filter(|b| bounds.contains(b)).collect();
                is_visible(&listing, &in_range, &bounds, &self.calendar).then_some(listing)
            })
            .collect();

        let hidden = total - visible.len();
        metrics::counter!(observability::LISTINGS_EVALUATED_TOTAL).increment(total as u64);
        metrics::counter!(observability::LISTINGS_HIDDEN_TOTAL).increment(hidden as u64);
        info!(
            total,
            visible = visible.len(),
            hidden,
            weeks = bounds.weeks.len(),
            "listings filtered by booking limitations"
        );
        Ok(visible)
    }

    async fn fetch(&self, listing: &Listing) -> Result<Vec<Booking>, FilterError> {
        let request = self.source.bookings(listing);
        let result = match self.fetch_timeout {
            Some(after) => match tokio::time::timeout(after, request).await {
                Ok(result) => result,
                Err(_) => {
                    error!(listing = %listing.id, ?after, "booking fetch timed out");
                    metrics::counter!(observability::FETCH_FAILURES_TOTAL).increment(1);
                    return Err(FilterError::Timeout {
                        listing: listing.id,
                        after,
                    });
                }
            },
            None => request.await,
        };
        result.map_err(|source| {
            error!(listing = %listing.id, "booking fetch failed: {source}");
            metrics::counter!(observability::FETCH_FAILURES_TOTAL).increment(1);
            FilterError::Fetch {
                listing: listing.id,
                source,
            }
        })
    }
}
