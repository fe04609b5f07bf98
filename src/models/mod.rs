// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BandThresholds, BoundingBox, ConfidenceBand, Coordinate, Place, RatingEvent};
pub use requests::{NearbyRequest, ResolveQuery, SubmitRatingRequest};
pub use responses::{
    ErrorResponse, HealthResponse, NearbyResponse, PlaceStatus, ResolveResponse,
    SubmitRatingResponse,
};
