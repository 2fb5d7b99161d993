pub mod collaborative;
pub mod content_based;
pub mod engine;
pub mod profile;
pub mod similarity;

pub use engine::RecommendationEngine;
pub use profile::{NoopPreferenceVectorizer, PreferenceVectorizer};
