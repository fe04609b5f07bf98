use crate::models::Place;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the remote document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the remote real-time place directory
///
/// The store exposes a documents API per collection; this client covers
/// the three operations the core needs:
/// - fetching the complete place collection (the subscription's full
///   snapshot),
/// - writing an updated rating aggregate back to one place,
/// - clearing a place's rating state during an expiry sweep.
pub struct StoreClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    places_collection: String,
    client: Client,
}

impl StoreClient {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        places_collection: String,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            places_collection,
            client,
        })
    }

    fn places_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.places_collection
        )
    }

    /// Fetch the complete current place set
    ///
    /// The store delivers full snapshots, not deltas; records that fail to
    /// parse are skipped with a warning rather than poisoning the whole
    /// snapshot.
    pub async fn list_places(&self) -> Result<Vec<Place>, StoreError> {
        let url = self.places_url();

        tracing::debug!("Fetching place collection from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project-Id", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to list places: {}",
                status
            )));
        }

        let body: Value = response.json().await?;

        let documents = body
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        let places: Vec<Place> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                match serde_json::from_value::<Place>(data.clone()) {
                    Ok(place) => Some(place),
                    Err(e) => {
                        tracing::warn!("Skipping unparseable place record: {}", e);
                        None
                    }
                }
            })
            .collect();

        tracing::debug!("Fetched {} places", places.len());

        Ok(places)
    }

    /// Persist a recomputed rating aggregate for one place
    ///
    /// The caller has already validated the contribution and folded it into
    /// the aggregate; this just writes the result. The mirror observes the
    /// new value on its next snapshot.
    pub async fn write_rating(
        &self,
        place_id: &str,
        rater_id: Option<&str>,
        rating: f64,
        rating_count: u32,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.places_url(), urlencoding::encode(place_id));

        let payload = json!({
            "rating": rating,
            "ratingCount": rating_count,
            "updatedAt": updated_at,
            "lastRaterId": rater_id,
        });

        let response = self
            .client
            .patch(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project-Id", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(StoreError::NotFound(format!("Place {}", place_id)));
        }
        if status.as_u16() == 401 {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to write rating for {}: {}",
                place_id, status
            )));
        }

        tracing::debug!(
            "Wrote rating for {}: {} over {} contributions",
            place_id,
            rating,
            rating_count
        );

        Ok(())
    }

    /// Reset a place to unrated (expiry sweep)
    pub async fn clear_rating(&self, place_id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.places_url(), urlencoding::encode(place_id));

        let payload = json!({
            "rating": 0.0,
            "ratingCount": 0,
        });

        let response = self
            .client
            .patch(&url)
            .header("X-Api-Key", &self.api_key)
            .header("X-Project-Id", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(StoreError::NotFound(format!("Place {}", place_id)));
        }
        if !status.is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to clear rating for {}: {}",
                place_id, status
            )));
        }

        tracing::debug!("Cleared stale rating for {}", place_id);

        Ok(())
    }
}
