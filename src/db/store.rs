use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        ContentFeatureVector, ContentFilters, RecommendationHistory, UserContentInteraction,
        UserPreference,
    },
};

/// Data-access seam between the recommendation engine and storage.
///
/// Preferences, interactions and feature vectors are owned by other
/// services and read-only here; recommendation history is the one entity
/// this engine writes. Production uses the Postgres implementation, tests
/// substitute mocks or an in-memory store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// The user's stated preference record, if they have one
    async fn get_user_preference(&self, user_id: Uuid) -> AppResult<Option<UserPreference>>;

    /// Full interaction history for one user, most recent first
    async fn get_user_interactions(&self, user_id: Uuid)
        -> AppResult<Vec<UserContentInteraction>>;

    /// Feature vectors for a specific set of content ids. Content without
    /// a stored vector is simply absent from the result.
    async fn get_feature_vectors_by_ids(
        &self,
        content_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<f64>>>;

    /// All stored feature vectors whose metadata matches the filters
    async fn get_content_feature_vectors(
        &self,
        filters: &ContentFilters,
    ) -> AppResult<Vec<ContentFeatureVector>>;

    /// Interactions by any user other than `exclude_user` touching the
    /// given content ids. Single batched query for similar-user discovery.
    async fn get_interactions_for_content(
        &self,
        content_ids: &[Uuid],
        exclude_user: Uuid,
    ) -> AppResult<Vec<UserContentInteraction>>;

    /// Interactions by the given set of users, batched in one query
    async fn get_interactions_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<UserContentInteraction>>;

    /// Appends recommendation audit rows
    async fn save_recommendation_history(
        &self,
        records: &[RecommendationHistory],
    ) -> AppResult<()>;
}
