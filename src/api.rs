//! Typed learning-server endpoints
//!
//! [`LearningApi`] is the seam between the workspace controller and the
//! network. [`HttpLearningApi`] implements it on top of the [`Gateway`];
//! tests substitute in-process fakes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{LearnmapError, Result};
use crate::gateway::Gateway;
use crate::models::{Material, NewSessionRequest, SessionDetail, SessionSummary};

pub const MATERIALS_PATH: &str = "/api/v1/materials/";
pub const SESSIONS_PATH: &str = "/api/v1/learning/sessions";

/// Path of a single session.
pub fn session_path(id: i64) -> String {
    format!("{}/{}", SESSIONS_PATH, id)
}

/// Convert a raw JSON value into `T`, reporting shape mismatches as
/// [`LearnmapError::Schema`].
pub fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| LearnmapError::Schema(format!("{}: {}", what, e)).into())
}

/// Data operations the workspace needs from the server.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// `GET /api/v1/materials/`
    async fn list_materials(&self) -> Result<Vec<Material>>;

    /// `GET /api/v1/learning/sessions`
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// `GET /api/v1/learning/sessions/{id}`
    async fn get_session(&self, id: i64) -> Result<SessionDetail>;

    /// `POST /api/v1/learning/sessions`
    async fn create_session(&self, request: &NewSessionRequest) -> Result<SessionDetail>;
}

/// [`LearningApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLearningApi {
    gateway: Gateway,
}

impl HttpLearningApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl LearningApi for HttpLearningApi {
    async fn list_materials(&self) -> Result<Vec<Material>> {
        let value = self.gateway.get(MATERIALS_PATH).await?;
        decode(value, "material list")
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let value = self.gateway.get(SESSIONS_PATH).await?;
        decode(value, "session list")
    }

    async fn get_session(&self, id: i64) -> Result<SessionDetail> {
        let value = self.gateway.get(&session_path(id)).await?;
        decode(value, "session detail")
    }

    async fn create_session(&self, request: &NewSessionRequest) -> Result<SessionDetail> {
        tracing::info!(
            "Creating session '{}' with {} material(s)",
            request.title,
            request.material_ids.len()
        );
        let value = self.gateway.post(SESSIONS_PATH, request).await?;
        decode(value, "created session")
    }
}
