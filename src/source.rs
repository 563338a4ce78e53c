use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::model::{Booking, Listing, ListingId};

/// Where a listing's bookings come from (the marketplace transaction store
/// in production).
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn bookings(&self, listing: &Listing) -> Result<Vec<Booking>, FetchError>;
}

#[async_trait]
impl<T: BookingSource + ?Sized> BookingSource for Arc<T> {
    async fn bookings(&self, listing: &Listing) -> Result<Vec<Booking>, FetchError> {
        (**self).bookings(listing).await
    }
}

/// Failure reported by a [`BookingSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// In-memory bookings per listing. Listings never inserted have none.
#[derive(Debug, Default)]
pub struct MemoryBookings {
    bookings: DashMap<ListingId, Vec<Booking>>,
}

impl MemoryBookings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: ListingId, booking: Booking) {
        self.bookings.entry(listing).or_default().push(booking);
    }

    pub fn extend(&self, listing: ListingId, bookings: impl IntoIterator<Item = Booking>) {
        self.bookings.entry(listing).or_default().extend(bookings);
    }

    /// Number of listings with at least one stored booking.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl From<HashMap<Uuid, Vec<Booking>>> for MemoryBookings {
    fn from(map: HashMap<Uuid, Vec<Booking>>) -> Self {
        let bookings = map
            .into_iter()
            .map(|(uuid, list)| (ListingId::new(uuid), list))
            .collect();
        Self { bookings }
    }
}

#[async_trait]
impl BookingSource for MemoryBookings {
    async fn bookings(&self, listing: &Listing) -> Result<Vec<Booking>, FetchError> {
        Ok(self
            .bookings
            .get(&listing.id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
