//! Reviewgraph Gatekeeper
//!
//! Cleans the triples a completion backend produced for one review before
//! they are persisted.
//!
//! The Gatekeeper provides, in order:
//! - Shape repair of triple objects whose keys are positional rather than canonical
//! - Well-formedness and noisy-predicate filtering
//! - Grounding against the review's own title and text
//! - Case-insensitive deduplication within the review
//!
//! # Examples
//!
//! ```
//! use reviewgraph_gatekeeper::Gatekeeper;
//! use serde_json::json;
//!
//! let gatekeeper = Gatekeeper::default_config();
//! let raw = json!([{"subject": "user", "praises": "faux_nails"}]);
//! let triples = gatekeeper.repair_and_validate(&raw, "Love the faux nails", "Cute");
//!
//! assert_eq!(triples.len(), 1);
//! assert_eq!(triples[0].predicate, "praises");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod repair;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use repair::{classify_shape, repair_shape, TripleShape};
pub use validator::{Gatekeeper, RejectionReason, SourceTokens, TripleReport};
