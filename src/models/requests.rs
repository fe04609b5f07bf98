use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to select places near a coordinate
///
/// Both coordinate components are optional; when either is missing the
/// selection runs against the configured default center, which is also how
/// the initial startup selection works. `previous_ids` carries the caller's
/// session selection so far; the response merges newly discovered nearby
/// places into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyRequest {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    #[serde(alias = "previous_ids", rename = "previousIds")]
    pub previous_ids: Vec<String>,
}

/// Request to submit a busyness rating for a place
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRatingRequest {
    #[serde(default)]
    #[serde(alias = "rater_id", rename = "raterId")]
    pub rater_id: Option<String>,
    #[validate(range(min = 1.0, max = 5.0))]
    pub value: f64,
}

/// Query for resolving a place name to its coordinate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveQuery {
    #[validate(length(min = 1))]
    pub name: String,
}
