//! Triple validation logic

use crate::repair::{repair_shape, TripleShape};
use crate::ValidationConfig;
use reviewgraph_domain::Triple;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// The bare schema key; a predicate that contains it is a tokenizer artifact
const PREDICATE_KEY: &str = "predicate";

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The value is not a JSON object
    NotAnObject,

    /// A required field is absent or not a string
    MissingField(&'static str),

    /// A required field is an empty string
    EmptyField(&'static str),

    /// The predicate is a known garbage value
    NoisyPredicate(String),

    /// Neither subject nor object can be found in the review
    Ungrounded {
        /// Rejected subject
        subject: String,
        /// Rejected object
        object: String,
    },

    /// The same statement already appeared earlier in this review
    Duplicate(Triple),
}

/// Outcome of reviewing one completion's triples
#[derive(Debug, Clone, Default)]
pub struct TripleReport {
    /// Accepted triples in the order the backend produced them
    pub triples: Vec<Triple>,

    /// Number of values rewritten by shape repair
    pub repaired: usize,

    /// Why each dropped value was dropped
    pub rejections: Vec<RejectionReason>,
}

/// Lowercased word set of a review's title and text
#[derive(Debug, Clone)]
pub struct SourceTokens {
    tokens: HashSet<String>,
}

impl SourceTokens {
    /// Tokenize the concatenation of `title` and `text`
    pub fn new(title: &str, text: &str) -> Self {
        let joined = format!("{} {}", title, text);
        Self {
            tokens: tokenize(&joined).collect(),
        }
    }

    /// Whether `token` occurs in the review
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

/// Lowercase, treat underscores as spaces, split on whitespace
///
/// Punctuation stays attached to its word, so `a/c` is one token and
/// `nails!` does not match `nails`.
fn tokenize(text: &str) -> impl Iterator<Item = String> {
    text.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

/// The Gatekeeper cleans triples before they are persisted
pub struct Gatekeeper {
    config: ValidationConfig,
    generic_terms: HashSet<String>,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        let generic_terms = config
            .generic_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        Self {
            config,
            generic_terms,
        }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Repair, validate, ground and deduplicate the `triples` field of one
    /// completion, returning only the accepted triples
    pub fn repair_and_validate(&self, raw: &Value, review_text: &str, review_title: &str) -> Vec<Triple> {
        self.review(raw, review_text, review_title).triples
    }

    /// Like [`Gatekeeper::repair_and_validate`], but also reports what was
    /// repaired and why values were dropped
    ///
    /// A `raw` value that is not an array yields an empty report.
    pub fn review(&self, raw: &Value, review_text: &str, review_title: &str) -> TripleReport {
        let mut report = TripleReport::default();

        let Some(items) = raw.as_array() else {
            debug!("triples field is not an array, treating as empty");
            return report;
        };

        let source = SourceTokens::new(review_title, review_text);
        let mut seen = HashSet::new();

        for item in items {
            // 1. Shape repair
            let value = if self.config.repair_shapes {
                let (value, shape) = repair_shape(item.clone());
                if matches!(shape, TripleShape::KeyAsPredicate | TripleShape::Positional) {
                    report.repaired += 1;
                }
                value
            } else {
                item.clone()
            };

            // 2. Well-formedness and noise
            let triple = match self.check_well_formed(&value) {
                Ok(triple) => triple,
                Err(reason) => {
                    debug!("Rejected triple {}: {:?}", value, reason);
                    report.rejections.push(reason);
                    continue;
                }
            };

            // 3. Grounding
            if self.config.validate_grounding && !self.is_grounded(&triple, &source) {
                debug!("Rejected ungrounded triple {}", triple);
                report.rejections.push(RejectionReason::Ungrounded {
                    subject: triple.subject,
                    object: triple.object,
                });
                continue;
            }

            // 4. Deduplication
            if self.config.deduplicate && !seen.insert(triple.dedup_key()) {
                report.rejections.push(RejectionReason::Duplicate(triple));
                continue;
            }

            report.triples.push(triple);
        }

        report
    }

    /// Whether `predicate` is a known garbage value
    ///
    /// Matching is case-sensitive. Rejects blacklisted values, values
    /// containing a configured noisy substring, and anything that embeds the
    /// bare schema key without being exactly that key.
    pub fn is_noisy_predicate(&self, predicate: &str) -> bool {
        if self.config.noisy_predicates.iter().any(|p| p == predicate) {
            return true;
        }
        if self
            .config
            .noisy_substrings
            .iter()
            .any(|s| predicate.contains(s.as_str()))
        {
            return true;
        }
        predicate != PREDICATE_KEY && predicate.contains(PREDICATE_KEY)
    }

    /// Validate field presence, non-emptiness and the predicate blacklist
    fn check_well_formed(&self, value: &Value) -> Result<Triple, RejectionReason> {
        let obj = value.as_object().ok_or(RejectionReason::NotAnObject)?;

        let field = |name: &'static str| -> Result<String, RejectionReason> {
            let s = obj
                .get(name)
                .and_then(Value::as_str)
                .ok_or(RejectionReason::MissingField(name))?;
            if s.trim().is_empty() {
                return Err(RejectionReason::EmptyField(name));
            }
            Ok(s.to_string())
        };

        let subject = field("subject")?;
        let predicate = field("predicate")?;
        let object = field("object")?;

        if self.config.filter_noisy_predicates && self.is_noisy_predicate(&predicate) {
            return Err(RejectionReason::NoisyPredicate(predicate));
        }

        Ok(Triple {
            subject,
            predicate,
            object,
        })
    }

    /// A triple is grounded when its subject or its object is generic or
    /// shares a long enough token with the review
    fn is_grounded(&self, triple: &Triple, source: &SourceTokens) -> bool {
        self.entity_grounded(&triple.subject, source) || self.entity_grounded(&triple.object, source)
    }

    fn entity_grounded(&self, entity: &str, source: &SourceTokens) -> bool {
        if self.generic_terms.contains(&entity.trim().to_lowercase()) {
            return true;
        }
        tokenize(entity)
            .filter(|t| t.chars().count() >= self.config.min_token_len)
            .any(|t| source.contains(&t))
    }
}
