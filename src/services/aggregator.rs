use crate::core::ratings::{RatingError, RatingPolicy};
use crate::models::RatingEvent;
use crate::services::mirror::DirectoryMirror;
use crate::services::store::{StoreClient, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Errors from rating submission and expiry sweeps
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("unknown place: {0}")]
    UnknownPlace(String),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a successful submission
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub event: RatingEvent,
    pub rating: f64,
    pub rating_count: u32,
}

/// Rating aggregator: folds contributions into per-place aggregates and
/// runs the expiry sweep
///
/// The aggregator never mutates the mirror's snapshot. Both submission and
/// sweep write through the store; the mirror observes the change on its
/// next snapshot. Concurrent submissions for the same place are not
/// serialized here; the store's last durable write wins.
pub struct RatingAggregator {
    store: Arc<StoreClient>,
    mirror: Arc<DirectoryMirror>,
    policy: RatingPolicy,
}

impl RatingAggregator {
    pub fn new(store: Arc<StoreClient>, mirror: Arc<DirectoryMirror>, policy: RatingPolicy) -> Self {
        Self {
            store,
            mirror,
            policy,
        }
    }

    pub fn policy(&self) -> &RatingPolicy {
        &self.policy
    }

    /// Submit one rating contribution for a place
    ///
    /// Validation failures reject immediately without touching any state.
    /// On success the recomputed mean is written remotely; a failed write
    /// surfaces to the caller and is not retried.
    pub async fn submit_rating(
        &self,
        place_id: &str,
        rater_id: Option<String>,
        value: f64,
    ) -> Result<SubmitOutcome, AggregatorError> {
        self.policy.validate(value)?;

        let snapshot = self.mirror.current();
        let place = snapshot
            .get(place_id)
            .ok_or_else(|| AggregatorError::UnknownPlace(place_id.to_string()))?;

        let (rating, rating_count) = self.policy.apply(place, value)?;
        let now = chrono::Utc::now();

        self.store
            .write_rating(place_id, rater_id.as_deref(), rating, rating_count, now)
            .await?;

        tracing::info!(
            "Rating submitted for {}: value {}, new aggregate {} over {} contributions",
            place_id,
            value,
            rating,
            rating_count
        );

        Ok(SubmitOutcome {
            event: RatingEvent {
                place_id: place_id.to_string(),
                rater_id,
                value,
                created_at: now,
            },
            rating,
            rating_count,
        })
    }

    /// One-shot sweep resetting places whose rating data has gone stale
    ///
    /// Runs at process start. A failed clear is logged and skipped; the
    /// sweep keeps going and the place stays a candidate for the next run.
    /// Returns how many places were reset.
    pub async fn sweep_expired(&self) -> usize {
        let snapshot = self.mirror.current();
        let now = chrono::Utc::now();
        let mut cleared = 0;

        for place in snapshot.values() {
            if !self.policy.is_expired(place, now) {
                continue;
            }

            match self.store.clear_rating(&place.id).await {
                Ok(()) => {
                    tracing::info!("Expired rating cleared for {} ({})", place.id, place.name);
                    cleared += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to clear expired rating for {}: {}", place.id, e);
                }
            }
        }

        cleared
    }
}
