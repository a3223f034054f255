//! Configuration for the Extractor

use crate::ExtractorError;
use reviewgraph_domain::SamplingParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default in-flight limit for a local backend
pub const LOCAL_CONCURRENCY: usize = 4;

/// Default in-flight limit for a remote backend
pub const REMOTE_CONCURRENCY: usize = 16;

/// Round-robin slice of the dataset processed by one run
///
/// A record with 1-based index `i` belongs to shard `(i - 1) % count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Total number of shards
    pub count: u64,
    /// Shard handled by this run, in `0..count`
    pub id: u64,
}

impl Shard {
    /// Whether the record with `index` belongs to this shard
    pub fn includes(&self, index: u64) -> bool {
        self.count > 0 && index.saturating_sub(1) % self.count == self.id
    }

    /// Validate the shard bounds
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.count == 0 {
            return Err(ExtractorError::Config("shard count must be > 0".to_string()));
        }
        if self.id >= self.count {
            return Err(ExtractorError::Config(format!(
                "shard id must be in range [0, {}]",
                self.count - 1
            )));
        }
        Ok(())
    }
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum number of records in flight at once
    pub concurrency: usize,

    /// Attempts per record before it is abandoned
    pub max_attempts: u32,

    /// Pause after a failed attempt (milliseconds)
    pub retry_backoff_ms: u64,

    /// Label prepended to the review text in the user message
    pub prompt_label: String,

    /// Sampling parameters sent with every request
    pub sampling: SamplingParams,

    /// Optional round-robin shard
    pub shard: Option<Shard>,
}

impl ExtractorConfig {
    /// Preset for a local inference backend
    pub fn local() -> Self {
        Self::default()
    }

    /// Preset for a remote chat-completion service
    pub fn remote() -> Self {
        Self {
            concurrency: REMOTE_CONCURRENCY,
            ..Self::default()
        }
    }

    /// Get the retry backoff as a Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.concurrency == 0 {
            return Err(ExtractorError::Config(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ExtractorError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if let Some(shard) = &self.shard {
            shard.validate()?;
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            concurrency: LOCAL_CONCURRENCY,
            max_attempts: 10,
            retry_backoff_ms: 500,
            prompt_label: "Text: ".to_string(),
            sampling: SamplingParams::default(),
            shard: None,
        }
    }
}

/// Output file used when none is given: `<input dir>/output/<stem>_output.jsonl`
pub fn default_output_path(input: &Path, shard: Option<Shard>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reviews".to_string());

    let file_name = match shard {
        Some(shard) => format!("{}_output_split_{}.jsonl", stem, shard.id),
        None => format!("{}_output.jsonl", stem),
    };

    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("output")
        .join(file_name)
}
