use std::time::Duration;

use crate::model::ListingId;
use crate::source::FetchError;

#[derive(Debug)]
pub enum FilterError {
    /// The booking source failed for this listing; the batch is abandoned.
    Fetch {
        listing: ListingId,
        source: FetchError,
    },
    /// The booking source did not answer for this listing in time.
    Timeout {
        listing: ListingId,
        after: Duration,
    },
    /// A query bound was given but could not be read as a date.
    InvalidRange(String),
}

impl FilterError {
    /// The listing whose fetch sank the batch, if any.
    pub fn listing(&self) -> Option<ListingId> {
        match self {
            FilterError::Fetch { listing, .. } | FilterError::Timeout { listing, .. } => {
                Some(*listing)
            }
            FilterError::InvalidRange(_) => None,
        }
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Fetch { listing, source } => {
                write!(f, "fetching bookings for listing {listing} failed: {source}")
            }
            FilterError::Timeout { listing, after } => {
                write!(
                    f,
                    "fetching bookings for listing {listing} timed out after {}ms",
                    after.as_millis()
                )
            }
            FilterError::InvalidRange(raw) => write!(f, "invalid date in query range: {raw:?}"),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}
