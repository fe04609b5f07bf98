// Service exports
pub mod aggregator;
pub mod mirror;
pub mod store;

pub use aggregator::{AggregatorError, RatingAggregator, SubmitOutcome};
pub use mirror::{run_subscription, DirectoryMirror, Snapshot};
pub use store::{StoreClient, StoreError};
