use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentFilters, Metadata};

/// Precomputed embedding of a content item in the shared feature space.
///
/// All vectors compared against each other (or against a user profile)
/// must have the same length; a mismatch is a data-integrity fault
/// surfaced by the similarity layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFeatureVector {
    pub content_id: Uuid,
    pub feature_vector: Vec<f64>,
    /// Carries `content_type`, `subject` and `difficulty_level` string
    /// fields used by candidate filtering.
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentFeatureVector {
    /// Exact-match check of the metadata fields against the given filters.
    /// Unset filter fields match everything.
    pub fn matches_filters(&self, filters: &ContentFilters) -> bool {
        let field_matches = |key: &str, expected: &Option<String>| match expected {
            Some(value) => self
                .metadata
                .get(key)
                .and_then(|v| v.as_str())
                .is_some_and(|actual| actual == value),
            None => true,
        };

        field_matches("content_type", &filters.content_type)
            && field_matches("subject", &filters.subject)
            && field_matches("difficulty_level", &filters.difficulty_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vector_with_metadata(metadata: Metadata) -> ContentFeatureVector {
        ContentFeatureVector {
            content_id: Uuid::new_v4(),
            feature_vector: vec![1.0, 0.0],
            metadata,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let vector = vector_with_metadata(Metadata::new());
        assert!(vector.matches_filters(&ContentFilters::default()));
    }

    #[test]
    fn test_filters_exact_match() {
        let mut metadata = Metadata::new();
        metadata.insert("content_type".to_string(), json!("video"));
        metadata.insert("subject".to_string(), json!("math"));
        let vector = vector_with_metadata(metadata);

        let filters = ContentFilters {
            content_type: Some("video".to_string()),
            subject: Some("math".to_string()),
            difficulty_level: None,
        };
        assert!(vector.matches_filters(&filters));

        let filters = ContentFilters {
            content_type: Some("quiz".to_string()),
            ..Default::default()
        };
        assert!(!vector.matches_filters(&filters));
    }

    #[test]
    fn test_missing_metadata_field_fails_set_filter() {
        let vector = vector_with_metadata(Metadata::new());
        let filters = ContentFilters {
            difficulty_level: Some("beginner".to_string()),
            ..Default::default()
        };
        assert!(!vector.matches_filters(&filters));
    }
}
