//! Error types for Learnmap
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// HTTP status the server uses to reject a missing or invalid bearer token.
const UNAUTHORIZED: u16 = 401;

/// Main error type for Learnmap operations
///
/// Every failure that callers need to branch on is represented here so that
/// it can be recovered from an `anyhow::Error` with `downcast_ref`.
#[derive(Error, Debug)]
pub enum LearnmapError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local input validation failed before any request was made
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status
    ///
    /// `body` is the raw response text, kept verbatim so it can be shown to
    /// the user next to the action that triggered it.
    #[error("Request failed with HTTP {status}: {body}")]
    Request {
        /// HTTP status code returned by the server
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// Authentication errors surfaced to the user (rejected login, no credential)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Response JSON did not have the expected shape
    #[error("Unexpected response shape: {0}")]
    Schema(String),

    /// Credential persistence errors outside the keyring (file backend)
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl LearnmapError {
    /// Returns `true` when this error means the server rejected our credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use learnmap::error::LearnmapError;
    ///
    /// let err = LearnmapError::Request { status: 401, body: "{}".into() };
    /// assert!(err.is_auth_failure());
    /// ```
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Request { status, .. } => *status == UNAUTHORIZED,
            Self::Authentication(_) => true,
            _ => false,
        }
    }
}

/// Returns `true` if `err` wraps a [`LearnmapError`] that is an auth failure.
pub fn is_auth_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LearnmapError>()
        .map(LearnmapError::is_auth_failure)
        .unwrap_or(false)
}

/// Result type alias for Learnmap operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
