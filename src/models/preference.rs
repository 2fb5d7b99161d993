use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Metadata;

/// Preferred mode of learning, stated during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    ReadingWriting,
}

impl std::str::FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            "reading_writing" => Ok(LearningStyle::ReadingWriting),
            other => Err(format!("unknown learning style: {}", other)),
        }
    }
}

/// A user's stated content preferences.
///
/// At most one record per user. Owned by the user service; the
/// recommendation engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: Uuid,
    #[serde(default)]
    pub preferred_subjects: Vec<String>,
    #[serde(default)]
    pub preferred_content_types: Vec<String>,
    #[serde(default)]
    pub preferred_difficulty_levels: Vec<String>,
    pub learning_style: Option<LearningStyle>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
