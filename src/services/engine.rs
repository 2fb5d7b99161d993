use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    db::RecommendationStore,
    error::AppResult,
    models::{
        ContentFilters, Metadata, Recommendation, RecommendationHistory, RecommendationType,
        UserContentInteraction,
    },
};

use super::{
    collaborative::{find_similar_users, score_from_similar_users},
    content_based::score_candidates,
    profile::{build_user_profile, PreferenceVectorizer},
};

/// Weight of the content-based component in the hybrid score. Collaborative
/// signal is noisier while interaction data is sparse, so it gets less.
pub const CONTENT_BASED_WEIGHT: f64 = 0.6;
pub const COLLABORATIVE_WEIGHT: f64 = 0.4;

/// Hybrid recommendation engine combining content-based and collaborative
/// filtering.
///
/// Stateless per request: all storage access goes through the injected
/// store, and the only configuration is the fixed interaction weight table
/// on [`crate::models::InteractionType`].
pub struct RecommendationEngine {
    store: Arc<dyn RecommendationStore>,
    vectorizer: Arc<dyn PreferenceVectorizer>,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn RecommendationStore>,
        vectorizer: Arc<dyn PreferenceVectorizer>,
    ) -> Self {
        Self { store, vectorizer }
    }

    /// Produces up to `limit` hybrid recommendations for a user.
    ///
    /// An empty list is a valid outcome for users with no interaction or
    /// preference history. Data-access failures fail the request; the
    /// history audit write never does.
    pub async fn get_recommendations(
        &self,
        user_id: Uuid,
        filters: &ContentFilters,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let preference = self.store.get_user_preference(user_id).await?;
        let interactions = self.store.get_user_interactions(user_id).await?;

        let seen: HashSet<Uuid> = interactions.iter().map(|i| i.content_id).collect();
        let seen_ids: Vec<Uuid> = seen.iter().copied().collect();
        let interacted_vectors = self.store.get_feature_vectors_by_ids(&seen_ids).await?;

        let profile = build_user_profile(
            &interactions,
            &interacted_vectors,
            preference.as_ref(),
            self.vectorizer.as_ref(),
        );

        // The two scorers are independent once the shared fetches are done;
        // run them concurrently.
        let (content_based, collaborative) = tokio::join!(
            self.content_based_recommendations(&profile, &seen, filters, limit),
            self.collaborative_recommendations(user_id, &interactions, &seen, filters, limit),
        );
        let content_based = content_based?;
        let collaborative = collaborative?;

        tracing::debug!(
            user_id = %user_id,
            content_based = content_based.len(),
            collaborative = collaborative.len(),
            "Scorer results"
        );

        let recommendations = hybrid_merge(content_based, collaborative, limit);

        self.record_history(user_id, &recommendations).await;

        tracing::info!(
            user_id = %user_id,
            count = recommendations.len(),
            "Recommendations produced"
        );

        Ok(recommendations)
    }

    async fn content_based_recommendations(
        &self,
        profile: &[f64],
        seen: &HashSet<Uuid>,
        filters: &ContentFilters,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        if profile.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = self.store.get_content_feature_vectors(filters).await?;
        Ok(score_candidates(profile, &candidates, seen, limit))
    }

    async fn collaborative_recommendations(
        &self,
        user_id: Uuid,
        interactions: &[UserContentInteraction],
        seen: &HashSet<Uuid>,
        filters: &ContentFilters,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        // No anchor set means no similar users can exist.
        if interactions.is_empty() {
            return Ok(Vec::new());
        }

        let anchor_ids: Vec<Uuid> = seen.iter().copied().collect();
        let other_interactions = self
            .store
            .get_interactions_for_content(&anchor_ids, user_id)
            .await?;

        let similar_users = find_similar_users(interactions, &other_interactions);
        if similar_users.is_empty() {
            return Ok(Vec::new());
        }

        let similar_ids: Vec<Uuid> = similar_users.iter().map(|u| u.user_id).collect();
        let their_interactions = self.store.get_interactions_for_users(&similar_ids).await?;

        // Metadata filtering happens against stored vector records; only
        // fetch them when a filter is actually set.
        let candidate_vectors: HashMap<Uuid, _> = if filters.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_content_feature_vectors(&ContentFilters::default())
                .await?
                .into_iter()
                .map(|v| (v.content_id, v))
                .collect()
        };

        Ok(score_from_similar_users(
            &similar_users,
            &their_interactions,
            seen,
            filters,
            &candidate_vectors,
            limit,
        ))
    }

    /// Appends one history row per emitted recommendation. Failure here is
    /// logged and swallowed: the audit trail is a side effect, not a
    /// correctness dependency of the returned list.
    async fn record_history(&self, user_id: Uuid, recommendations: &[Recommendation]) {
        if recommendations.is_empty() {
            return;
        }
        let records: Vec<RecommendationHistory> = recommendations
            .iter()
            .map(|r| RecommendationHistory::for_recommendation(user_id, r))
            .collect();

        if let Err(e) = self.store.save_recommendation_history(&records).await {
            tracing::warn!(
                user_id = %user_id,
                count = records.len(),
                error = %e,
                "Failed to record recommendation history"
            );
        }
    }
}

/// Merges the two scored sets into one ranked hybrid list.
///
/// `hybrid = 0.6 * content_based + 0.4 * collaborative`; entries present
/// in only one set score 0 on the other component. Metadata from both
/// sources is merged, collaborative keys winning on conflict.
pub fn hybrid_merge(
    content_based: Vec<Recommendation>,
    collaborative: Vec<Recommendation>,
    limit: usize,
) -> Vec<Recommendation> {
    struct MergedEntry {
        content_based_score: f64,
        collaborative_score: f64,
        metadata: Metadata,
    }

    let mut merged: HashMap<Uuid, MergedEntry> = HashMap::new();

    for rec in content_based {
        merged.insert(
            rec.content_id,
            MergedEntry {
                content_based_score: rec.score,
                collaborative_score: 0.0,
                metadata: rec.metadata,
            },
        );
    }

    for rec in collaborative {
        match merged.get_mut(&rec.content_id) {
            Some(entry) => {
                entry.collaborative_score = rec.score;
                entry.metadata.extend(rec.metadata);
            }
            None => {
                merged.insert(
                    rec.content_id,
                    MergedEntry {
                        content_based_score: 0.0,
                        collaborative_score: rec.score,
                        metadata: rec.metadata,
                    },
                );
            }
        }
    }

    let mut recommendations: Vec<Recommendation> = merged
        .into_iter()
        .map(|(content_id, entry)| {
            let hybrid_score = CONTENT_BASED_WEIGHT * entry.content_based_score
                + COLLABORATIVE_WEIGHT * entry.collaborative_score;

            let mut metadata = entry.metadata;
            metadata.insert("hybrid_score".to_string(), json!(hybrid_score));
            metadata.insert(
                "content_based_score".to_string(),
                json!(entry.content_based_score),
            );
            metadata.insert(
                "collaborative_score".to_string(),
                json!(entry.collaborative_score),
            );
            metadata.insert("recommendation_source".to_string(), json!("hybrid"));

            Recommendation {
                content_id,
                score: hybrid_score,
                recommendation_type: RecommendationType::Hybrid,
                metadata,
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.content_id.cmp(&b.content_id))
    });
    recommendations.truncate(limit);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockRecommendationStore;
    use crate::models::{ContentFeatureVector, InteractionType};
    use crate::services::profile::NoopPreferenceVectorizer;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn recommendation(
        content_id: Uuid,
        score: f64,
        recommendation_type: RecommendationType,
    ) -> Recommendation {
        Recommendation {
            content_id,
            score,
            recommendation_type,
            metadata: Metadata::new(),
        }
    }

    fn interaction(
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
        engagement_score: f64,
    ) -> UserContentInteraction {
        UserContentInteraction {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            interaction_type,
            engagement_score,
            time_spent: 60,
            progress: 100.0,
            metadata: Metadata::new(),
            created_at: Utc::now(),
        }
    }

    fn feature_vector(content_id: Uuid, feature_vector: Vec<f64>) -> ContentFeatureVector {
        ContentFeatureVector {
            content_id,
            feature_vector,
            metadata: Metadata::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn engine(store: MockRecommendationStore) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(store), Arc::new(NoopPreferenceVectorizer))
    }

    #[test]
    fn test_hybrid_score_formula() {
        let shared = Uuid::new_v4();
        let content_based = vec![recommendation(
            shared,
            0.8,
            RecommendationType::ContentBased,
        )];
        let collaborative = vec![recommendation(
            shared,
            0.5,
            RecommendationType::Collaborative,
        )];

        let merged = hybrid_merge(content_based, collaborative, 10);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.6 * 0.8 + 0.4 * 0.5);
        assert_eq!(merged[0].recommendation_type, RecommendationType::Hybrid);
        assert_eq!(merged[0].metadata["content_based_score"], json!(0.8));
        assert_eq!(merged[0].metadata["collaborative_score"], json!(0.5));
    }

    #[test]
    fn test_single_source_entries_score_zero_on_other_component() {
        let only_content = Uuid::new_v4();
        let only_collab = Uuid::new_v4();
        let merged = hybrid_merge(
            vec![recommendation(
                only_content,
                1.0,
                RecommendationType::ContentBased,
            )],
            vec![recommendation(
                only_collab,
                1.0,
                RecommendationType::Collaborative,
            )],
            10,
        );

        assert_eq!(merged.len(), 2);
        let by_id: HashMap<Uuid, &Recommendation> =
            merged.iter().map(|r| (r.content_id, r)).collect();
        assert_eq!(by_id[&only_content].score, 0.6);
        assert_eq!(by_id[&only_collab].score, 0.4);
    }

    #[test]
    fn test_merged_output_sorted_and_limited() {
        let mut content_based = Vec::new();
        for i in 0..5 {
            content_based.push(recommendation(
                Uuid::new_v4(),
                0.1 * i as f64,
                RecommendationType::ContentBased,
            ));
        }

        let merged = hybrid_merge(content_based, Vec::new(), 3);
        assert_eq!(merged.len(), 3);
        for pair in merged.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_collaborative_metadata_wins_on_conflict() {
        let shared = Uuid::new_v4();
        let mut content_based = recommendation(shared, 0.8, RecommendationType::ContentBased);
        content_based
            .metadata
            .insert("debug_note".to_string(), json!("from_content"));
        let mut collaborative = recommendation(shared, 0.5, RecommendationType::Collaborative);
        collaborative
            .metadata
            .insert("debug_note".to_string(), json!("from_collab"));

        let merged = hybrid_merge(vec![content_based], vec![collaborative], 10);
        assert_eq!(merged[0].metadata["debug_note"], json!("from_collab"));
        // The final source tag is always hybrid, stamped after the merge.
        assert_eq!(merged[0].metadata["recommendation_source"], json!("hybrid"));
    }

    #[tokio::test]
    async fn test_new_user_gets_empty_list() {
        let user_id = Uuid::new_v4();
        let mut store = MockRecommendationStore::new();
        store
            .expect_get_user_preference()
            .with(eq(user_id))
            .returning(|_| Ok(None));
        store
            .expect_get_user_interactions()
            .with(eq(user_id))
            .returning(|_| Ok(Vec::new()));
        store
            .expect_get_feature_vectors_by_ids()
            .returning(|_| Ok(HashMap::new()));
        // No history row is written for an empty list.
        store.expect_save_recommendation_history().never();

        let engine = engine(store);
        let recommendations = engine
            .get_recommendations(user_id, &ContentFilters::default(), 10)
            .await
            .unwrap();
        assert!(recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_content_based_pipeline_end_to_end() {
        // One complete on A ([1,0]); candidates B ([1,0]) and C ([0,1]).
        // Expect exactly B at score 0.6 * 1.0 on the hybrid scale.
        let user_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let mut store = MockRecommendationStore::new();
        store.expect_get_user_preference().returning(|_| Ok(None));
        {
            let interactions = vec![interaction(user_id, a, InteractionType::Complete, 1.0)];
            store
                .expect_get_user_interactions()
                .returning(move |_| Ok(interactions.clone()));
        }
        store
            .expect_get_feature_vectors_by_ids()
            .returning(move |_| Ok(HashMap::from([(a, vec![1.0, 0.0])])));
        {
            let candidates = vec![
                feature_vector(a, vec![1.0, 0.0]),
                feature_vector(b, vec![1.0, 0.0]),
                feature_vector(c, vec![0.0, 1.0]),
            ];
            store
                .expect_get_content_feature_vectors()
                .returning(move |_| Ok(candidates.clone()));
        }
        store
            .expect_get_interactions_for_content()
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_save_recommendation_history()
            .withf(move |records| {
                records.len() == 1
                    && records[0].content_id == b
                    && records[0].recommendation_type == RecommendationType::Hybrid
            })
            .times(1)
            .returning(|_| Ok(()));

        let engine = engine(store);
        let recommendations = engine
            .get_recommendations(user_id, &ContentFilters::default(), 10)
            .await
            .unwrap();

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].content_id, b);
        assert!((recommendations[0].score - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_data_access_failure_propagates() {
        let user_id = Uuid::new_v4();
        let mut store = MockRecommendationStore::new();
        store.expect_get_user_preference().returning(|_| Ok(None));
        store
            .expect_get_user_interactions()
            .returning(|_| Err(crate::error::AppError::Database(sqlx::Error::PoolClosed)));

        let engine = engine(store);
        let result = engine
            .get_recommendations(user_id, &ContentFilters::default(), 10)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_history_write_failure_is_swallowed() {
        let user_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut store = MockRecommendationStore::new();
        store.expect_get_user_preference().returning(|_| Ok(None));
        {
            let interactions = vec![interaction(user_id, a, InteractionType::Like, 1.0)];
            store
                .expect_get_user_interactions()
                .returning(move |_| Ok(interactions.clone()));
        }
        store
            .expect_get_feature_vectors_by_ids()
            .returning(move |_| Ok(HashMap::from([(a, vec![1.0, 0.0])])));
        {
            let candidates = vec![feature_vector(b, vec![1.0, 0.0])];
            store
                .expect_get_content_feature_vectors()
                .returning(move |_| Ok(candidates.clone()));
        }
        store
            .expect_get_interactions_for_content()
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_save_recommendation_history()
            .times(1)
            .returning(|_| Err(crate::error::AppError::Database(sqlx::Error::PoolClosed)));

        let engine = engine(store);
        let recommendations = engine
            .get_recommendations(user_id, &ContentFilters::default(), 10)
            .await
            .unwrap();

        // The caller still receives the computed list.
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].content_id, b);
    }
}
