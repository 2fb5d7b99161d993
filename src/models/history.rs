use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Metadata, Recommendation, RecommendationType};

/// Audit record of a recommendation emitted to a user.
///
/// The engine is the sole writer of these rows. The `clicked` flag is
/// flipped later by the click-tracking service, never by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub recommendation_type: RecommendationType,
    pub score: f64,
    pub clicked: bool,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl RecommendationHistory {
    /// Builds the audit row for a recommendation emitted to `user_id`.
    pub fn for_recommendation(user_id: Uuid, recommendation: &Recommendation) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id: recommendation.content_id,
            recommendation_type: recommendation.recommendation_type,
            score: recommendation.score,
            clicked: false,
            metadata: recommendation.metadata.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_recommendation_copies_fields() {
        let user_id = Uuid::new_v4();
        let recommendation = Recommendation {
            content_id: Uuid::new_v4(),
            score: 0.42,
            recommendation_type: RecommendationType::Hybrid,
            metadata: Metadata::new(),
        };

        let history = RecommendationHistory::for_recommendation(user_id, &recommendation);
        assert_eq!(history.user_id, user_id);
        assert_eq!(history.content_id, recommendation.content_id);
        assert_eq!(history.score, 0.42);
        assert_eq!(history.recommendation_type, RecommendationType::Hybrid);
        assert!(!history.clicked);
    }
}
