use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{UserContentInteraction, UserPreference};

/// Maps a stated preference record into the content feature space.
///
/// How preferences project onto feature dimensions depends on the feature
/// engineering that produced the content vectors, so this is an explicit
/// extension point. The default implementation opts out and the profile
/// falls back to interaction signal alone.
pub trait PreferenceVectorizer: Send + Sync {
    /// Returns the preference vector, or `None` when no mapping is defined
    fn vectorize(&self, preference: &UserPreference) -> Option<Vec<f64>>;
}

/// Default vectorizer with no preference-to-feature mapping
pub struct NoopPreferenceVectorizer;

impl PreferenceVectorizer for NoopPreferenceVectorizer {
    fn vectorize(&self, _preference: &UserPreference) -> Option<Vec<f64>> {
        None
    }
}

/// Builds the user profile vector: the weighted average of interacted
/// content vectors, optionally averaged with a preference-derived vector.
///
/// Interactions whose content has no stored vector are skipped; fresh
/// content often has no vector yet. Returns an empty vector when no usable
/// signal exists.
pub fn build_user_profile(
    interactions: &[UserContentInteraction],
    content_vectors: &HashMap<Uuid, Vec<f64>>,
    preference: Option<&UserPreference>,
    vectorizer: &dyn PreferenceVectorizer,
) -> Vec<f64> {
    let mut profile: Option<Vec<f64>> = None;
    let mut total_weight = 0.0;

    for interaction in interactions {
        let Some(vector) = content_vectors.get(&interaction.content_id) else {
            continue;
        };
        let weight = interaction.weight();

        match profile.as_mut() {
            None => {
                profile = Some(vector.iter().map(|x| x * weight).collect());
            }
            Some(acc) => {
                if acc.len() != vector.len() {
                    tracing::warn!(
                        content_id = %interaction.content_id,
                        expected = acc.len(),
                        actual = vector.len(),
                        "Feature vector dimension mismatch, skipping interaction"
                    );
                    continue;
                }
                for (slot, x) in acc.iter_mut().zip(vector.iter()) {
                    *slot += x * weight;
                }
            }
        }
        total_weight += weight;
    }

    let interaction_profile = match profile {
        Some(acc) if total_weight > 0.0 => {
            Some(acc.into_iter().map(|x| x / total_weight).collect::<Vec<_>>())
        }
        _ => None,
    };

    let preference_profile = preference.and_then(|p| vectorizer.vectorize(p));

    match (interaction_profile, preference_profile) {
        (Some(from_interactions), Some(from_preferences)) => {
            if from_interactions.len() != from_preferences.len() {
                tracing::warn!(
                    interaction_len = from_interactions.len(),
                    preference_len = from_preferences.len(),
                    "Preference vector dimension mismatch, using interaction profile only"
                );
                return from_interactions;
            }
            from_interactions
                .iter()
                .zip(from_preferences.iter())
                .map(|(a, b)| (a + b) / 2.0)
                .collect()
        }
        (Some(from_interactions), None) => from_interactions,
        (None, Some(from_preferences)) => from_preferences,
        (None, None) => Vec::new(),
    }
}
