//! Busymap - live place-busyness directory service
//!
//! This library maintains a locally-consistent mirror of a remotely-updated
//! place directory, selects the subset of places nearest a moving reference
//! point, and aggregates crowd-sourced rating submissions into a decaying
//! busyness score with discrete confidence bands.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::haversine_distance, ratings::RatingPolicy, selector::Selector,
};
pub use crate::models::{ConfidenceBand, Coordinate, Place, RatingEvent};
pub use crate::services::{DirectoryMirror, RatingAggregator, StoreClient};
