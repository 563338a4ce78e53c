//! Listing visibility under recurring booking limits.
//!
//! A query range is cut into calendar weeks; a listing stays visible while at
//! least one of those weeks still has capacity under its limitation config.

pub mod config;
pub mod engine;
pub mod model;
pub mod observability;
pub mod source;
