//! Load the nested review dataset into flat, indexed records

use crate::error::ExtractorError;
use reviewgraph_domain::ReviewRecord;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

// Identifier, rating and title keys must be present but may hold any JSON
// value; they are copied to the output untouched.
#[derive(Deserialize)]
struct SourceUser {
    id: Value,
    profile: Vec<SourceReview>,
}

#[derive(Deserialize)]
struct SourceReview {
    pid: Value,
    rating: Value,
    title: Value,
    text: String,
}

/// Read and flatten the dataset at `path`
pub async fn load_reviews(path: &Path) -> Result<Vec<ReviewRecord>, ExtractorError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let records = parse_reviews(&contents).map_err(|reason| ExtractorError::DataFormat {
        path: path.display().to_string(),
        reason,
    })?;

    info!("Loaded {} reviews from {}", records.len(), path.display());
    Ok(records)
}

/// Flatten a dataset document into records
///
/// Indices start at 1 and follow user order, then profile order within a
/// user. The same document always yields the same indices.
pub fn parse_reviews(contents: &str) -> Result<Vec<ReviewRecord>, String> {
    let users: Vec<SourceUser> = serde_json::from_str(contents).map_err(|e| e.to_string())?;

    let records = users
        .into_iter()
        .flat_map(|user| {
            let user_id = user.id;
            user.profile.into_iter().map(move |review| (user_id.clone(), review))
        })
        .zip(1u64..)
        .map(|((user_id, review), index)| ReviewRecord {
            index,
            user_id,
            product_id: review.pid,
            rating: review.rating,
            title: review.title,
            text: review.text,
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TWO_USERS: &str = r#"[
        {"id": "A1", "profile": [
            {"pid": "P1", "rating": 5, "title": "Cute", "text": "Love the faux nails"},
            {"pid": "P2", "rating": "3.0", "title": "Meh", "text": "too small"}
        ]},
        {"id": 42, "profile": [
            {"pid": "P3", "rating": 1.0, "title": "Bad", "text": "waste of money", "extra": true}
        ]}
    ]"#;

    #[test]
    fn test_indices_follow_traversal_order() {
        let records = parse_reviews(TWO_USERS).unwrap();
        let indices: Vec<u64> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);

        assert_eq!(records[0].user_id, "A1");
        assert_eq!(records[1].product_id, "P2");
        assert_eq!(records[2].text, "waste of money");
    }

    #[test]
    fn test_indexing_is_deterministic() {
        assert_eq!(parse_reviews(TWO_USERS).unwrap(), parse_reviews(TWO_USERS).unwrap());
    }

    #[test]
    fn test_empty_profiles_are_skipped_without_gaps() {
        let doc = r#"[
            {"id": "A", "profile": []},
            {"id": "B", "profile": [{"pid": "P", "rating": 4, "title": "t", "text": "x"}]}
        ]"#;
        let records = parse_reviews(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, 1);
        assert_eq!(records[0].user_id, "B");
    }

    #[test]
    fn test_not_a_sequence() {
        assert!(parse_reviews(r#"{"id": "A", "profile": []}"#).is_err());
    }

    #[test]
    fn test_missing_profile() {
        assert!(parse_reviews(r#"[{"id": "A"}]"#).is_err());
    }

    #[test]
    fn test_missing_review_field() {
        let doc = r#"[{"id": "A", "profile": [{"pid": "P", "rating": 4, "title": "t"}]}]"#;
        let err = parse_reviews(doc).unwrap_err();
        assert!(err.contains("text"));
    }

    #[test]
    fn test_source_values_pass_through_unchanged() {
        let records = parse_reviews(TWO_USERS).unwrap();
        assert_eq!(records[0].rating, json!(5));
        assert!(records[0].rating.is_u64());
        assert_eq!(records[1].rating, json!("3.0"));
        assert_eq!(records[2].rating, json!(1.0));
        assert_eq!(records[2].user_id, json!(42));
    }

    #[test]
    fn test_unusual_values_are_not_fatal() {
        let doc = r#"[{"id": null, "profile": [
            {"pid": ["P", 1], "rating": "five", "title": null, "text": "x"}
        ]}]"#;
        let records = parse_reviews(doc).unwrap();
        assert_eq!(records[0].user_id, Value::Null);
        assert_eq!(records[0].product_id, json!(["P", 1]));
        assert_eq!(records[0].rating, "five");
        assert_eq!(records[0].title_text(), "");
    }

    #[test]
    fn test_missing_rating_key() {
        let doc = r#"[{"id": "A", "profile": [{"pid": "P", "title": "t", "text": "x"}]}]"#;
        let err = parse_reviews(doc).unwrap_err();
        assert!(err.contains("rating"));
    }

    #[test]
    fn test_missing_title_key() {
        let doc = r#"[{"id": "A", "profile": [{"pid": "P", "rating": 1, "text": "x"}]}]"#;
        let err = parse_reviews(doc).unwrap_err();
        assert!(err.contains("title"));
    }

    #[tokio::test]
    async fn test_load_reports_data_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let result = load_reviews(&path).await;
        assert!(matches!(result, Err(ExtractorError::DataFormat { .. })));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_reviews(&dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(ExtractorError::Io(_))));
    }
}
