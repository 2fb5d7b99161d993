pub mod postgres;
pub mod store;

pub use postgres::{create_pool, PgRecommendationStore};
pub use store::RecommendationStore;
