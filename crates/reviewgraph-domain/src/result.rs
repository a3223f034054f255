//! The per-review record persisted to the output dataset

use crate::{ReviewRecord, Triple};
use serde::{Deserialize, Serialize};

/// One line of the output JSON-Lines file
///
/// Carries the original review fields, the `idx` the checkpoint scan keys on,
/// and the cleaned triple list. Created once per successfully processed
/// review and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The source review, flattened into the same JSON object
    #[serde(flatten)]
    pub review: ReviewRecord,

    /// Triples that survived repair, validation, grounding and deduplication
    pub triples: Vec<Triple>,
}

impl ExtractionResult {
    /// Build a result for `review`
    pub fn new(review: ReviewRecord, triples: Vec<Triple>) -> Self {
        Self { review, triples }
    }

    /// Index of the review this result belongs to
    pub fn index(&self) -> u64 {
        self.review.index
    }

    /// Serialize as a single JSON line without the trailing newline
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
