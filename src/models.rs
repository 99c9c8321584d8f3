//! Wire types exchanged with the learning server
//!
//! Field names match the server's JSON exactly. Nullable server fields are
//! `Option`s; list fields the server may omit default to empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing state of an uploaded material.
///
/// The server reports upper-case strings such as `PENDING` and `READY`.
/// Parsing is case-insensitive and unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialStatus {
    Pending,
    Uploaded,
    Processing,
    Ready,
    Failed,
    Other(String),
}

impl MaterialStatus {
    /// Returns `true` once the server has finished ingesting the material.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl From<String> for MaterialStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "uploaded" => Self::Uploaded,
            "processing" => Self::Processing,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl From<MaterialStatus> for String {
    fn from(value: MaterialStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Uploaded => write!(f, "UPLOADED"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Ready => write!(f, "READY"),
            Self::Failed => write!(f, "FAILED"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// An uploaded learning material as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub filename: String,
    pub status: MaterialStatus,
}

/// Lightweight projection of a learning session used for list display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub material_count: u32,
    #[serde(default)]
    pub prerequisite_count: u32,
}

/// One concept in a session's generated prerequisite map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteNode {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier of the parent node within the same session, if any.
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub wikipedia_summary: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
}

/// Full session record including linked materials and the node collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteNode>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Access/refresh token bundle identifying an authenticated user.
///
/// `refresh_token` is optional because the server may issue an access token
/// alone; logout then has nothing to invalidate server-side.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl CredentialPair {
    /// Value for the `Authorization` header.
    ///
    /// Always uses the `Bearer` scheme regardless of the case the server
    /// reported in `token_type`.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Tokens never appear in logs.
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Body of `POST /api/v1/learning/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSessionRequest {
    pub title: String,
    pub objective: Option<String>,
    pub material_ids: Vec<i64>,
}

/// Body of `POST /api/v1/auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Body of `POST /api/v1/auth/logout`.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}
