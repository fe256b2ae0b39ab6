/// Catalog module
///
/// In-memory product catalog: filtering, lookup by id and recommendations.

pub mod fixtures;
pub mod models;
pub mod queries;
pub mod recommender;
pub mod store;

pub use models::*;
pub use recommender::{RandomSampler, Recommender, DEFAULT_RECOMMENDATION_COUNT};
pub use store::{Catalog, Latency};
