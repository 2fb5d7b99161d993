use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::json;
use uuid::Uuid;

use crate::models::{
    ContentFeatureVector, ContentFilters, Metadata, Recommendation, RecommendationType,
    UserContentInteraction,
};

use super::similarity::{cosine_similarity, SIMILARITY_CUTOFF};

/// How many similar users feed the collaborative score
pub const MAX_SIMILAR_USERS: usize = 10;

/// A user whose interaction pattern resembles the target's, carrying the
/// similarity as an aggregation weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarUser {
    pub user_id: Uuid,
    pub similarity: f64,
}

/// Builds an interaction-strength vector over the sorted anchor set.
///
/// When a user has several interactions with the same content, the
/// strongest weight wins; the aggregation must be deterministic and max
/// keeps repeated weak views from drowning out one strong completion.
fn interaction_vector<'a>(
    interactions: impl IntoIterator<Item = &'a UserContentInteraction>,
    anchor_set: &BTreeSet<Uuid>,
) -> Vec<f64> {
    let index_of: HashMap<Uuid, usize> = anchor_set
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut vector = vec![0.0; anchor_set.len()];
    for interaction in interactions {
        if let Some(&idx) = index_of.get(&interaction.content_id) {
            vector[idx] = f64::max(vector[idx], interaction.weight());
        }
    }
    vector
}

/// Finds the users most similar to the target by comparing interaction
/// vectors over the target's anchor set.
///
/// `other_interactions` must already be restricted to interactions
/// touching the anchor set by users other than the target (one batched
/// query upstream). Returns at most [`MAX_SIMILAR_USERS`] entries, most
/// similar first, ties broken by user id.
pub fn find_similar_users(
    target_interactions: &[UserContentInteraction],
    other_interactions: &[UserContentInteraction],
) -> Vec<SimilarUser> {
    let anchor_set: BTreeSet<Uuid> = target_interactions
        .iter()
        .map(|i| i.content_id)
        .collect();
    if anchor_set.is_empty() {
        return Vec::new();
    }

    let mut by_user: HashMap<Uuid, Vec<&UserContentInteraction>> = HashMap::new();
    for interaction in other_interactions {
        by_user
            .entry(interaction.user_id)
            .or_default()
            .push(interaction);
    }

    let target_vector = interaction_vector(target_interactions, &anchor_set);

    let mut similar: Vec<SimilarUser> = Vec::new();
    for (user_id, interactions) in by_user {
        let other_vector = interaction_vector(interactions.iter().copied(), &anchor_set);

        // Both vectors are built over the same anchor set, so a mismatch
        // cannot happen here; treat it as zero signal if it ever does.
        let similarity = cosine_similarity(&target_vector, &other_vector).unwrap_or(0.0);
        if similarity > SIMILARITY_CUTOFF {
            similar.push(SimilarUser {
                user_id,
                similarity,
            });
        }
    }

    similar.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    similar.truncate(MAX_SIMILAR_USERS);
    similar
}

/// Aggregates similar users' interactions into per-content scores.
///
/// Contribution of one interaction is `user_similarity * type_weight *
/// engagement_score`, summed per content id. Content the target already
/// interacted with is skipped. When metadata filters are set, candidates
/// with a stored vector record must match them; candidates without a
/// record bypass filtering rather than failing.
pub fn score_from_similar_users(
    similar_users: &[SimilarUser],
    their_interactions: &[UserContentInteraction],
    seen: &HashSet<Uuid>,
    filters: &ContentFilters,
    candidate_vectors: &HashMap<Uuid, ContentFeatureVector>,
    limit: usize,
) -> Vec<Recommendation> {
    let weight_of: HashMap<Uuid, f64> = similar_users
        .iter()
        .map(|u| (u.user_id, u.similarity))
        .collect();

    let mut content_scores: HashMap<Uuid, f64> = HashMap::new();
    for interaction in their_interactions {
        if seen.contains(&interaction.content_id) {
            continue;
        }
        let Some(&user_weight) = weight_of.get(&interaction.user_id) else {
            continue;
        };

        if !filters.is_empty() {
            if let Some(vector) = candidate_vectors.get(&interaction.content_id) {
                if !vector.matches_filters(filters) {
                    continue;
                }
            }
        }

        *content_scores.entry(interaction.content_id).or_insert(0.0) +=
            user_weight * interaction.weight();
    }

    let mut recommendations: Vec<Recommendation> = content_scores
        .into_iter()
        .map(|(content_id, score)| {
            let mut metadata = Metadata::new();
            metadata.insert("collaborative_score".to_string(), json!(score));
            metadata.insert("recommendation_source".to_string(), json!("collaborative"));
            Recommendation {
                content_id,
                score,
                recommendation_type: RecommendationType::Collaborative,
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
