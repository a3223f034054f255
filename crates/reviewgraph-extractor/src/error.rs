//! Error types for the Extractor

use thiserror::Error;

/// Errors that abort a pipeline run
///
/// Per-record failures never surface here; see [`AttemptError`].
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The source dataset does not have the expected shape
    #[error("Malformed dataset {path}: {reason}")]
    DataFormat {
        /// Dataset path
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Task scheduling error
    #[error("Concurrency error: {0}")]
    Concurrency(String),
}

/// Why a single extraction attempt failed
///
/// Every variant is recovered by retrying the record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// The completion is not valid JSON
    #[error("output was not valid JSON: {0}")]
    InvalidJson(String),

    /// The completion is a bare array instead of the envelope object
    #[error("model returned a list instead of an object")]
    BareArray,

    /// The envelope object lacks the `triples` key
    #[error("model output missing 'triples' key")]
    MissingTriples,

    /// The completion is a JSON scalar
    #[error("model returned a JSON {0} instead of an object")]
    NotAnEnvelope(&'static str),

    /// The backend call itself failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Appending the result line failed
    #[error("failed to append result: {0}")]
    Io(String),
}
