//! Reviewgraph Domain Layer
//!
//! Core value types and trait interfaces shared by every other crate in the
//! workspace. Infrastructure (HTTP backends, files, concurrency) lives elsewhere.
//!
//! ## Key Concepts
//!
//! - **ReviewRecord**: one flattened review with a stable 1-based index
//! - **Triple**: a subject-predicate-object statement, the unit of the graph
//! - **ExtractionResult**: the line persisted per successfully processed review
//! - **CompletionBackend**: the unreliable language model behind the pipeline

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod result;
pub mod review;
pub mod traits;
pub mod triple;

// Re-exports for convenience
pub use result::ExtractionResult;
pub use review::ReviewRecord;
pub use traits::{CompletionBackend, CompletionRequest, SamplingParams};
pub use triple::Triple;
