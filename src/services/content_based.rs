use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use crate::models::{ContentFeatureVector, Metadata, Recommendation, RecommendationType};

use super::similarity::{cosine_similarity, SIMILARITY_CUTOFF};

/// Ranks unseen candidates by cosine similarity to the user profile.
///
/// Candidates the user has already interacted with are excluded, as are
/// candidates with non-positive similarity (not a positive signal).
/// Dimension-mismatched candidates are dropped individually with a
/// warning. Ties are broken by content id so results are deterministic.
pub fn score_candidates(
    profile: &[f64],
    candidates: &[ContentFeatureVector],
    seen: &HashSet<Uuid>,
    limit: usize,
) -> Vec<Recommendation> {
    if profile.is_empty() {
        return Vec::new();
    }

    let mut recommendations: Vec<Recommendation> = Vec::new();
    for candidate in candidates {
        if seen.contains(&candidate.content_id) {
            continue;
        }

        let similarity = match cosine_similarity(profile, &candidate.feature_vector) {
            Ok(similarity) => similarity,
            Err(e) => {
                tracing::warn!(
                    content_id = %candidate.content_id,
                    error = %e,
                    "Excluding candidate with mismatched feature vector"
                );
                continue;
            }
        };

        if similarity <= SIMILARITY_CUTOFF {
            continue;
        }

        let mut metadata = Metadata::new();
        metadata.insert("similarity_score".to_string(), json!(similarity));
        metadata.insert("recommendation_source".to_string(), json!("content_based"));

        recommendations.push(Recommendation {
            content_id: candidate.content_id,
            score: similarity,
            recommendation_type: RecommendationType::ContentBased,
            metadata,
        });
    }

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
    use chrono::Utc;

    fn candidate(content_id: Uuid, feature_vector: Vec<f64>) -> ContentFeatureVector {
        ContentFeatureVector {
            content_id,
            feature_vector,
            metadata: Metadata::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_profile_yields_nothing() {
        let candidates = vec![candidate(Uuid::new_v4(), vec![1.0, 0.0])];
        let result = score_candidates(&[], &candidates, &HashSet::new(), 10);
        assert!(result.is_empty());
    }

    #[test]
    fn test_seen_content_excluded_and_nonpositive_dropped() {
        // Profile [1,0]; A already seen, B aligned, C orthogonal.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let candidates = vec![
            candidate(a, vec![1.0, 0.0]),
            candidate(b, vec![1.0, 0.0]),
            candidate(c, vec![0.0, 1.0]),
        ];
        let seen = HashSet::from([a]);

        let result = score_candidates(&[1.0, 0.0], &candidates, &seen, 10);

        // Only B survives: A is seen, C scores 0.0 which is not > 0.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content_id, b);
        assert!((result[0].score - 1.0).abs() < 1e-9);
        assert_eq!(
            result[0].recommendation_type,
            RecommendationType::ContentBased
        );
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let profile = vec![1.0, 0.0];
        let close = Uuid::new_v4();
        let closer = Uuid::new_v4();
        let closest = Uuid::new_v4();
        let candidates = vec![
            candidate(close, vec![1.0, 2.0]),
            candidate(closest, vec![1.0, 0.0]),
            candidate(closer, vec![1.0, 1.0]),
        ];

        let result = score_candidates(&profile, &candidates, &HashSet::new(), 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].content_id, closest);
        assert_eq!(result[1].content_id, closer);
        assert!(result[0].score >= result[1].score);
    }

    #[test]
    fn test_equal_scores_tie_break_by_content_id() {
        let profile = vec![1.0, 0.0];
        let mut ids = [Uuid::new_v4(), Uuid::new_v4()];
        ids.sort();
        let candidates = vec![
            candidate(ids[1], vec![2.0, 0.0]),
            candidate(ids[0], vec![3.0, 0.0]),
        ];

        let result = score_candidates(&profile, &candidates, &HashSet::new(), 10);
        assert_eq!(result[0].content_id, ids[0]);
        assert_eq!(result[1].content_id, ids[1]);
    }

    #[test]
    fn test_mismatched_candidate_is_skipped() {
        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let candidates = vec![
            candidate(bad, vec![1.0, 0.0, 0.0]),
            candidate(good, vec![1.0, 0.0]),
        ];

        let result = score_candidates(&[1.0, 0.0], &candidates, &HashSet::new(), 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].content_id, good);
    }
}
