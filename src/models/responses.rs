use crate::models::domain::{Coordinate, ConfidenceBand};
use serde::{Deserialize, Serialize};

/// One selected place with its current busyness status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceStatus {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "categoryTags")]
    pub category_tags: Vec<String>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub rating: Option<f64>,
    #[serde(rename = "ratingCount")]
    pub rating_count: u32,
    pub band: ConfidenceBand,
    #[serde(rename = "displayValue")]
    pub display_value: Option<f64>,
}

/// Response for the nearby selection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub places: Vec<PlaceStatus>,
    #[serde(rename = "totalCatalog")]
    pub total_catalog: usize,
}

/// Response for name resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
}

/// Response for a rating submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRatingResponse {
    pub success: bool,
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub rating: f64,
    #[serde(rename = "ratingCount")]
    pub rating_count: u32,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
