use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ContentFilters, Recommendation},
};

use super::AppState;

/// Bounds on the caller-facing `limit` parameter
const MIN_LIMIT: usize = 1;
const MAX_LIMIT: usize = 50;

fn default_limit() -> usize {
    10
}

/// Request body for `POST /api/v1/recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: Uuid,
    pub content_type: Option<String>,
    pub subject: Option<String>,
    pub difficulty_level: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationList {
    pub recommendations: Vec<Recommendation>,
    pub total: usize,
}

/// Validates the requested limit against the caller-facing contract
pub(crate) fn validate_limit(limit: usize) -> AppResult<usize> {
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between {} and {}, got {}",
            MIN_LIMIT, MAX_LIMIT, limit
        )));
    }
    Ok(limit)
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Produces personalized hybrid recommendations for a user
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationList>> {
    let limit = validate_limit(request.limit)?;

    let filters = ContentFilters {
        content_type: request.content_type,
        subject: request.subject,
        difficulty_level: request.difficulty_level,
    };

    let recommendations = state
        .engine
        .get_recommendations(request.user_id, &filters, limit)
        .await?;

    let total = recommendations.len();
    Ok(Json(RecommendationList {
        recommendations,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_bounds() {
        assert!(validate_limit(0).is_err());
        assert_eq!(validate_limit(1).unwrap(), 1);
        assert_eq!(validate_limit(10).unwrap(), 10);
        assert_eq!(validate_limit(50).unwrap(), 50);
        assert!(validate_limit(51).is_err());
    }

    #[test]
    fn test_request_default_limit() {
        let request: RecommendationRequest = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(request.limit, 10);
        assert!(request.content_type.is_none());
    }
}
