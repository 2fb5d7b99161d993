use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Metadata;

/// How a user engaged with a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    View,
    Complete,
    Like,
    Bookmark,
}

impl InteractionType {
    /// Fixed weight expressing how strong a preference signal this
    /// interaction type carries. Completion is the strongest signal,
    /// a bare view the weakest.
    pub fn weight(self) -> f64 {
        match self {
            InteractionType::View => 1.0,
            InteractionType::Complete => 3.0,
            InteractionType::Like => 2.0,
            InteractionType::Bookmark => 2.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Complete => "complete",
            InteractionType::Like => "like",
            InteractionType::Bookmark => "bookmark",
        }
    }
}

impl std::str::FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(InteractionType::View),
            "complete" => Ok(InteractionType::Complete),
            "like" => Ok(InteractionType::Like),
            "bookmark" => Ok(InteractionType::Bookmark),
            other => Err(format!("unknown interaction type: {}", other)),
        }
    }
}

/// An immutable user-content interaction event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContentInteraction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub interaction_type: InteractionType,
    pub engagement_score: f64,
    /// Seconds spent on the content
    pub time_spent: i64,
    /// Completion percentage, 0.0-100.0
    pub progress: f64,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl UserContentInteraction {
    /// Combined weight of this interaction: fixed type weight scaled by the
    /// caller-supplied engagement score.
    pub fn weight(&self) -> f64 {
        self.interaction_type.weight() * self.engagement_score
    }
}
