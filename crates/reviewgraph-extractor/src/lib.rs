//! Reviewgraph Extractor
//!
//! Turns a nested dataset of product reviews into knowledge-graph triples,
//! one JSON line per review.
//!
//! # Overview
//!
//! Every review gets its own completion request. The reply is parsed, its
//! triples are repaired and validated by the Gatekeeper, and the surviving
//! triples are appended to the output file together with the review itself.
//! The output file doubles as the checkpoint: a rerun skips every review
//! whose index is already present.
//!
//! # Architecture
//!
//! ```text
//! Dataset → Loader → Pipeline ─┬→ Worker → Backend → Parser → Gatekeeper → Sink
//!                              ├→ Worker → ...
//!                              └→ (at most `concurrency` in flight)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use reviewgraph_extractor::{ExtractorConfig, Pipeline};
//! use reviewgraph_gatekeeper::Gatekeeper;
//! use reviewgraph_llm::MockBackend;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     MockBackend::default(),
//!     Gatekeeper::default_config(),
//!     ExtractorConfig::local(),
//! );
//!
//! let summary = pipeline
//!     .run(Path::new("data/reviews.json"), Path::new("data/output/reviews_output.jsonl"))
//!     .await?;
//!
//! println!("Succeeded: {}", summary.succeeded);
//! println!("Abandoned: {}", summary.exhausted);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod parser;
mod loader;
mod checkpoint;
mod sink;
mod worker;
mod pipeline;

#[cfg(test)]
mod tests;

pub use error::{AttemptError, ExtractorError};
pub use config::{default_output_path, ExtractorConfig, Shard, LOCAL_CONCURRENCY, REMOTE_CONCURRENCY};
pub use types::{RunSummary, StatusReport, WorkerOutcome};
pub use prompt::{extraction_schema, PromptBuilder, EXTRACTION_SYSTEM_PROMPT};
pub use parser::parse_envelope;
pub use loader::{load_reviews, parse_reviews};
pub use checkpoint::{completed_indices, scan_output, CheckpointScan};
pub use sink::ResultSink;
pub use worker::ExtractionWorker;
pub use pipeline::{status, Pipeline};
