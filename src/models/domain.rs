use serde::{Deserialize, Serialize};

/// A point on Earth's surface in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// A coordinate is usable only when both components are finite and
    /// within the valid lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A catalog entry: fixed location/category metadata plus a mutable
/// rating aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "categoryTags", default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "ratingCount", default)]
    pub rating_count: u32,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Place {
    /// The busyness aggregate, defined only while at least one live
    /// contribution exists.
    pub fn aggregate(&self) -> Option<f64> {
        if self.rating_count >= 1 {
            Some(self.rating)
        } else {
            None
        }
    }

    pub fn is_rated(&self) -> bool {
        self.rating_count >= 1
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A single rating contribution. Repeat contributions from the same rater
/// are independent events; no dedup happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEvent {
    #[serde(rename = "placeId")]
    pub place_id: String,
    #[serde(rename = "raterId")]
    pub rater_id: Option<String>,
    pub value: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Discrete confidence classification of a busyness aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Cold,
    Medium,
    Hot,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Band thresholds over the [1,5] rating scale. A boundary value belongs
/// to the upper band.
#[derive(Debug, Clone, Copy)]
pub struct BandThresholds {
    pub cold_max: f64,
    pub medium_max: f64,
    pub unrated_band: ConfidenceBand,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            cold_max: 2.333,
            medium_max: 3.666,
            unrated_band: ConfidenceBand::Hot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(34.0689, -118.4452).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_aggregate_undefined_when_unrated() {
        let place = Place {
            id: "p1".to_string(),
            name: "Powell Library".to_string(),
            latitude: 34.0716,
            longitude: -118.4422,
            category_tags: vec!["library".to_string()],
            rating: 0.0,
            rating_count: 0,
            updated_at: None,
        };

        assert!(place.aggregate().is_none());
        assert!(!place.is_rated());
    }

    #[test]
    fn test_aggregate_defined_when_rated() {
        let place = Place {
            id: "p1".to_string(),
            name: "Powell Library".to_string(),
            latitude: 34.0716,
            longitude: -118.4422,
            category_tags: vec!["library".to_string()],
            rating: 3.5,
            rating_count: 4,
            updated_at: Some(chrono::Utc::now()),
        };

        assert_eq!(place.aggregate(), Some(3.5));
    }
}
