use crate::models::{BandThresholds, ConfidenceBand, Place};
use thiserror::Error;

/// Errors from rating aggregation
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("rating value {value} outside [{min}, {max}]")]
    InvalidValue { value: f64, min: f64, max: f64 },
}

/// Aggregation, banding and expiry rules for busyness ratings
///
/// All pure computation; the remote write and the mirror refresh live in
/// the service layer.
#[derive(Debug, Clone)]
pub struct RatingPolicy {
    min_value: f64,
    max_value: f64,
    expiry: chrono::Duration,
    thresholds: BandThresholds,
}

impl RatingPolicy {
    pub fn new(
        min_value: f64,
        max_value: f64,
        expiry: chrono::Duration,
        thresholds: BandThresholds,
    ) -> Self {
        Self {
            min_value,
            max_value,
            expiry,
            thresholds,
        }
    }

    /// Reject out-of-range contributions before they touch any state
    pub fn validate(&self, value: f64) -> Result<(), RatingError> {
        if !value.is_finite() || value < self.min_value || value > self.max_value {
            return Err(RatingError::InvalidValue {
                value,
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }

    /// Fold a new contribution into a place's aggregate
    ///
    /// Returns the recomputed (aggregate, count) pair: the mean of all live
    /// values including the new one. An unrated place starts fresh at
    /// (value, 1).
    pub fn apply(&self, place: &Place, value: f64) -> Result<(f64, u32), RatingError> {
        self.validate(value)?;

        let (rating, count) = match place.aggregate() {
            Some(current) => {
                let count = place.rating_count;
                let rating = (current * count as f64 + value) / (count as f64 + 1.0);
                (rating, count + 1)
            }
            None => (value, 1),
        };

        Ok((rating, count))
    }

    /// Map an aggregate to its confidence band
    ///
    /// Thresholds mark the start of the upper band, so a value exactly at
    /// a boundary lands above it.
    pub fn band_for_aggregate(&self, aggregate: f64) -> ConfidenceBand {
        if aggregate < self.thresholds.cold_max {
            ConfidenceBand::Cold
        } else if aggregate < self.thresholds.medium_max {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Hot
        }
    }

    /// Band for a place; an unrated place falls back to the configured
    /// attention band (hot by default, carried over from the original
    /// marker behavior).
    pub fn band_for(&self, place: &Place) -> ConfidenceBand {
        match place.aggregate() {
            Some(aggregate) => self.band_for_aggregate(aggregate),
            None => self.thresholds.unrated_band,
        }
    }

    /// Linear [1,5] -> [0,100] display value
    ///
    /// An exact 0 is floored to 5 so the indicator ring stays visible.
    /// Undefined for unrated places.
    pub fn normalized_value(&self, place: &Place) -> Option<f64> {
        let aggregate = place.aggregate()?;
        let scaled = (aggregate - 1.0) * 100.0 / 4.0;
        if scaled == 0.0 {
            Some(5.0)
        } else {
            Some(scaled)
        }
    }

    /// Whether a place's rating data has gone stale
    ///
    /// A rated place with no recorded update time counts as stale.
    pub fn is_expired(&self, place: &Place, now: chrono::DateTime<chrono::Utc>) -> bool {
        if !place.is_rated() {
            return false;
        }
        match place.updated_at {
            Some(updated_at) => now - updated_at > self.expiry,
            None => true,
        }
    }
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            min_value: 1.0,
            max_value: 5.0,
            expiry: chrono::Duration::hours(24),
            thresholds: BandThresholds::default(),
        }
    }
}
