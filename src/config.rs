//! Configuration management for Learnmap
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Later sources win: file, then `LEARNMAP_*` variables, then flags.

use crate::error::{LearnmapError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Learnmap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Learning server connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Where the credential pair is persisted
    #[serde(default)]
    pub credentials: CredentialConfig,
    /// Workspace controller behavior
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Learning server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the server; endpoint paths are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Credential storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// OS keyring (default)
    #[default]
    Keyring,
    /// JSON file in the user data directory, or `credentials.file`
    File,
    /// Process memory; nothing survives exit
    Memory,
}

impl CredentialBackend {
    /// Parse a backend name (case-insensitive)
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyring" => Some(Self::Keyring),
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Credential storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Which backend stores the token pair
    #[serde(default)]
    pub backend: CredentialBackend,

    /// Explicit path for the file backend
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Profile name; separates credentials for different accounts or servers
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_profile() -> String {
    "default".to_string()
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            file: None,
            profile: default_profile(),
        }
    }
}

/// Which operations send the user back to the login prompt on a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailurePolicy {
    /// Any operation's 401 ends the workspace (default)
    #[default]
    Everywhere,
    /// Only the initial load redirects; later 401s are shown inline
    InitialLoadOnly,
}

impl AuthFailurePolicy {
    /// Parse a policy name (case-insensitive, `-` or `_`)
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "everywhere" => Some(Self::Everywhere),
            "initial_load_only" => Some(Self::InitialLoadOnly),
            _ => None,
        }
    }
}

/// Workspace controller settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Handling of authentication failures after the initial load
    #[serde(default)]
    pub auth_failure: AuthFailurePolicy,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line, for flag overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LearnmapError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| LearnmapError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("LEARNMAP_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("LEARNMAP_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid LEARNMAP_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(backend) = std::env::var("LEARNMAP_CREDENTIAL_BACKEND") {
            match CredentialBackend::parse_str(&backend) {
                Some(value) => self.credentials.backend = value,
                None => tracing::warn!("Invalid LEARNMAP_CREDENTIAL_BACKEND: {}", backend),
            }
        }

        if let Ok(file) = std::env::var("LEARNMAP_CREDENTIAL_FILE") {
            self.credentials.file = Some(PathBuf::from(file));
        }

        if let Ok(profile) = std::env::var("LEARNMAP_PROFILE") {
            self.credentials.profile = profile;
        }

        if let Ok(policy) = std::env::var("LEARNMAP_AUTH_FAILURE") {
            match AuthFailurePolicy::parse_str(&policy) {
                Some(value) => self.workspace.auth_failure = value,
                None => tracing::warn!("Invalid LEARNMAP_AUTH_FAILURE: {}", policy),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!("Using API base URL override: {}", api_url);
            self.api.base_url = api_url.clone();
        }
        if let Some(profile) = &cli.profile {
            self.credentials.profile = profile.clone();
        }
    }

    /// Parsed API base URL
    ///
    /// # Errors
    ///
    /// Returns error if `api.base_url` is not an absolute http(s) URL
    pub fn base_url(&self) -> Result<url::Url> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            LearnmapError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(LearnmapError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }
        Ok(url)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.api.timeout_seconds == 0 {
            return Err(
                LearnmapError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.credentials.profile.trim().is_empty() {
            return Err(
                LearnmapError::Config("credentials.profile cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
