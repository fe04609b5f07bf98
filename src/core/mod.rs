// Core algorithm exports
pub mod distance;
pub mod ratings;
pub mod selector;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use ratings::{RatingError, RatingPolicy};
pub use selector::{SelectedPlace, SelectionError, SelectionResult, Selector};
