use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

mod content;
mod history;
mod interaction;
mod preference;

pub use content::ContentFeatureVector;
pub use history::RecommendationHistory;
pub use interaction::{InteractionType, UserContentInteraction};
pub use preference::{LearningStyle, UserPreference};

/// Free-form diagnostic payload attached to records and recommendations.
///
/// Strictly for debugging/audit output; the scoring algorithms never read
/// from it.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Which strategy produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    ContentBased,
    Collaborative,
    Hybrid,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::ContentBased => "content_based",
            RecommendationType::Collaborative => "collaborative",
            RecommendationType::Hybrid => "hybrid",
        }
    }
}

impl Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecommendationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content_based" => Ok(RecommendationType::ContentBased),
            "collaborative" => Ok(RecommendationType::Collaborative),
            "hybrid" => Ok(RecommendationType::Hybrid),
            other => Err(format!("unknown recommendation type: {}", other)),
        }
    }
}

/// A single scored recommendation returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub content_id: Uuid,
    pub score: f64,
    pub recommendation_type: RecommendationType,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Exact-match candidate filters over content vector metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFilters {
    pub content_type: Option<String>,
    pub subject: Option<String>,
    pub difficulty_level: Option<String>,
}

impl ContentFilters {
    /// True when no filter field is set
    pub fn is_empty(&self) -> bool {
        self.content_type.is_none() && self.subject.is_none() && self.difficulty_level.is_none()
    }
}
