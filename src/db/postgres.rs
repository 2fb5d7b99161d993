use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        ContentFeatureVector, ContentFilters, Metadata, RecommendationHistory,
        UserContentInteraction, UserPreference,
    },
};

use super::store::RecommendationStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed implementation of the recommendation store
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn metadata_from_value(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

fn interaction_from_row(row: &PgRow) -> AppResult<UserContentInteraction> {
    let interaction_type: String = row.try_get("interaction_type")?;
    let interaction_type = interaction_type.parse().map_err(AppError::Internal)?;
    let metadata: serde_json::Value = row.try_get("metadata")?;

    Ok(UserContentInteraction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        content_id: row.try_get("content_id")?,
        interaction_type,
        engagement_score: row.try_get("engagement_score")?,
        time_spent: row.try_get("time_spent")?,
        progress: row.try_get("progress")?,
        metadata: metadata_from_value(metadata),
        created_at: row.try_get("created_at")?,
    })
}

fn feature_vector_from_row(row: &PgRow) -> AppResult<ContentFeatureVector> {
    let metadata: serde_json::Value = row.try_get("metadata")?;

    Ok(ContentFeatureVector {
        content_id: row.try_get("content_id")?,
        feature_vector: row.try_get("feature_vector")?,
        metadata: metadata_from_value(metadata),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn get_user_preference(&self, user_id: Uuid) -> AppResult<Option<UserPreference>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, preferred_subjects, preferred_content_types,
                   preferred_difficulty_levels, learning_style, interests,
                   metadata, created_at, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let learning_style: Option<String> = row.try_get("learning_style")?;
        let learning_style = learning_style.and_then(|s| match s.parse() {
            Ok(style) => Some(style),
            Err(_) => {
                tracing::warn!(user_id = %user_id, style = %s, "Unknown learning style, ignoring");
                None
            }
        });
        let metadata: serde_json::Value = row.try_get("metadata")?;

        Ok(Some(UserPreference {
            user_id: row.try_get("user_id")?,
            preferred_subjects: row.try_get("preferred_subjects")?,
            preferred_content_types: row.try_get("preferred_content_types")?,
            preferred_difficulty_levels: row.try_get("preferred_difficulty_levels")?,
            learning_style,
            interests: row.try_get("interests")?,
            metadata: metadata_from_value(metadata),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn get_user_interactions(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserContentInteraction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content_id, interaction_type, engagement_score,
                   time_spent, progress, metadata, created_at
            FROM user_content_interactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn get_feature_vectors_by_ids(
        &self,
        content_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<f64>>> {
        if content_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT content_id, feature_vector
            FROM content_feature_vectors
            WHERE content_id = ANY($1)
            "#,
        )
        .bind(content_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut vectors = HashMap::with_capacity(rows.len());
        for row in &rows {
            vectors.insert(row.try_get("content_id")?, row.try_get("feature_vector")?);
        }
        Ok(vectors)
    }

    async fn get_content_feature_vectors(
        &self,
        filters: &ContentFilters,
    ) -> AppResult<Vec<ContentFeatureVector>> {
        let rows = sqlx::query(
            r#"
            SELECT content_id, feature_vector, metadata, created_at, updated_at
            FROM content_feature_vectors
            WHERE ($1::text IS NULL OR metadata->>'content_type' = $1)
              AND ($2::text IS NULL OR metadata->>'subject' = $2)
              AND ($3::text IS NULL OR metadata->>'difficulty_level' = $3)
            "#,
        )
        .bind(filters.content_type.as_deref())
        .bind(filters.subject.as_deref())
        .bind(filters.difficulty_level.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(feature_vector_from_row).collect()
    }

    async fn get_interactions_for_content(
        &self,
        content_ids: &[Uuid],
        exclude_user: Uuid,
    ) -> AppResult<Vec<UserContentInteraction>> {
        if content_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content_id, interaction_type, engagement_score,
                   time_spent, progress, metadata, created_at
            FROM user_content_interactions
            WHERE content_id = ANY($1) AND user_id != $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(content_ids)
        .bind(exclude_user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn get_interactions_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<Vec<UserContentInteraction>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, content_id, interaction_type, engagement_score,
                   time_spent, progress, metadata, created_at
            FROM user_content_interactions
            WHERE user_id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn save_recommendation_history(
        &self,
        records: &[RecommendationHistory],
    ) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let user_ids: Vec<Uuid> = records.iter().map(|r| r.user_id).collect();
        let content_ids: Vec<Uuid> = records.iter().map(|r| r.content_id).collect();
        let types: Vec<String> = records
            .iter()
            .map(|r| r.recommendation_type.as_str().to_string())
            .collect();
        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        let clicked: Vec<bool> = records.iter().map(|r| r.clicked).collect();
        let metadata: Vec<serde_json::Value> = records
            .iter()
            .map(|r| serde_json::Value::Object(r.metadata.clone()))
            .collect();
        let created_at: Vec<DateTime<Utc>> = records.iter().map(|r| r.created_at).collect();

        sqlx::query(
            r#"
            INSERT INTO recommendation_history
                (id, user_id, content_id, recommendation_type, score, clicked,
                 metadata, created_at)
            SELECT * FROM UNNEST(
                $1::uuid[], $2::uuid[], $3::uuid[], $4::text[], $5::float8[],
                $6::bool[], $7::jsonb[], $8::timestamptz[]
            )
            "#,
        )
        .bind(&ids)
        .bind(&user_ids)
        .bind(&content_ids)
        .bind(&types)
        .bind(&scores)
        .bind(&clicked)
        .bind(&metadata)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
