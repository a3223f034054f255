//! Gatekeeper configuration

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};

/// Predicates produced when a model echoes or mangles the schema key name
const NOISY_PREDICATES: &[&str] = &[
    "predicate",
    "predicates",
    "predicat",
    "predicte",
    "predcate",
    "prediate",
    "preicate",
    "prdicate",
    "pedicate",
    "redicate",
    "predicatee",
    "predicateicate",
];

/// Substrings that mark a predicate as a tokenizer artifact
const NOISY_SUBSTRINGS: &[&str] = &["prediat"];

/// Entity labels that are accepted without textual grounding
const GENERIC_TERMS: &[&str] = &["user", "product", "review", "it", "this_product"];

/// Configuration for validation rules
///
/// The grounding constants are empirically tuned and therefore configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rewrite positional triple shapes into canonical ones
    pub repair_shapes: bool,

    /// Enable the noisy predicate filter
    pub filter_noisy_predicates: bool,

    /// Exact, case-sensitive predicates to reject
    pub noisy_predicates: Vec<String>,

    /// Predicates containing any of these substrings are rejected
    pub noisy_substrings: Vec<String>,

    /// Enable grounding against the review title and text
    pub validate_grounding: bool,

    /// Minimum token length (in characters) that counts as overlap
    pub min_token_len: usize,

    /// Entities that always count as grounded
    pub generic_terms: Vec<String>,

    /// Drop repeated triples within one review
    pub deduplicate: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            repair_shapes: true,
            filter_noisy_predicates: true,
            noisy_predicates: to_strings(NOISY_PREDICATES),
            noisy_substrings: to_strings(NOISY_SUBSTRINGS),
            validate_grounding: true,
            min_token_len: 3,
            generic_terms: to_strings(GENERIC_TERMS),
            deduplicate: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (no grounding filter)
    pub fn permissive() -> Self {
        Self {
            validate_grounding: false,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        if self.validate_grounding && self.min_token_len == 0 {
            return Err(GatekeeperError::Config(
                "min_token_len must be greater than 0".to_string(),
            ));
        }
        if self.noisy_substrings.iter().any(|s| s.is_empty()) {
            return Err(GatekeeperError::Config(
                "noisy_substrings must not contain empty strings".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, GatekeeperError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GatekeeperError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, GatekeeperError> {
        toml::to_string_pretty(self)
            .map_err(|e| GatekeeperError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.repair_shapes);
        assert!(config.validate_grounding);
        assert_eq!(config.min_token_len, 3);
        assert!(config.noisy_predicates.contains(&"predicate".to_string()));
        assert!(config.generic_terms.contains(&"this_product".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = ValidationConfig::permissive();
        assert!(!config.validate_grounding);
        assert!(config.filter_noisy_predicates);
    }

    #[test]
    fn test_zero_token_len_rejected() {
        let config = ValidationConfig {
            min_token_len: 0,
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ValidationConfig::from_toml("min_token_len = 4\ngeneric_terms = [\"user\"]").unwrap();
        assert_eq!(config.min_token_len, 4);
        assert_eq!(config.generic_terms, vec!["user".to_string()]);
        assert!(config.deduplicate);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ValidationConfig::default();
        let parsed = ValidationConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
