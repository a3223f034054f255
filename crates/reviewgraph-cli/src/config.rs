//! Configuration management for the CLI.

use crate::cli::BackendKind;
use crate::error::{CliError, Result};
use reviewgraph_extractor::{ExtractorConfig, LOCAL_CONCURRENCY, REMOTE_CONCURRENCY};
use reviewgraph_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// ```toml
/// backend = "remote"
///
/// [remote]
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
///
/// [extractor]
/// max_attempts = 5
///
/// [validation]
/// min_token_len = 4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend used when `--backend` is not given
    #[serde(default)]
    pub backend: BackendKind,

    /// Local backend profile
    #[serde(default)]
    pub local: LocalProfile,

    /// Remote backend profile
    #[serde(default)]
    pub remote: RemoteProfile,

    /// Pipeline settings; `concurrency` here is replaced by the backend profile's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<ExtractorConfig>,

    /// Triple validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Local (Ollama) backend profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalProfile {
    /// Server URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// In-flight limit
    pub concurrency: usize,
}

/// Remote (OpenAI-compatible) backend profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteProfile {
    /// Service URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// In-flight limit
    pub concurrency: usize,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".reviewgraph").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config
            .validation
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Extractor settings for `backend`, before command-line overrides.
    pub fn extractor_for(&self, backend: BackendKind) -> ExtractorConfig {
        let mut extractor = self.extractor.clone().unwrap_or_default();
        extractor.concurrency = match backend {
            BackendKind::Local => self.local.concurrency,
            BackendKind::Remote => self.remote.concurrency,
        };
        extractor
    }
}

impl Default for LocalProfile {
    fn default() -> Self {
        Self {
            endpoint: reviewgraph_llm::ollama::DEFAULT_ENDPOINT.to_string(),
            model: "mistral".to_string(),
            concurrency: LOCAL_CONCURRENCY,
        }
    }
}

impl Default for RemoteProfile {
    fn default() -> Self {
        Self {
            endpoint: reviewgraph_llm::openai::DEFAULT_ENDPOINT.to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: reviewgraph_llm::openai::DEFAULT_API_KEY_ENV.to_string(),
            concurrency: REMOTE_CONCURRENCY,
        }
    }
}
