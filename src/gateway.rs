//! Authenticated request gateway
//!
//! [`Gateway`] wraps every HTTP call to the learning server. It reads the
//! current credential from the injected [`CredentialStore`] right before
//! each request and attaches it as `Authorization: Bearer <token>`. When no
//! credential is stored the request goes out unauthenticated and the server
//! decides.
//!
//! # Response handling
//!
//! - `2xx` with a body: parsed as JSON and returned as [`serde_json::Value`].
//! - `2xx` with an empty body: [`serde_json::Value::Null`].
//! - Any other status: [`LearnmapError::Request`] with the status and the
//!   raw body text. The gateway does not interpret statuses; callers use
//!   [`LearnmapError::is_auth_failure`].
//! - Connection or timeout failures: [`LearnmapError::Http`].
//!
//! No schema validation happens here.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::{LearnmapError, Result};

/// HTTP gateway to the learning server.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use learnmap::credentials::MemoryCredentialStore;
/// use learnmap::gateway::Gateway;
///
/// # async fn example() -> learnmap::error::Result<()> {
/// let gateway = Gateway::new(
///     url::Url::parse("http://localhost:8000")?,
///     Arc::new(MemoryCredentialStore::new()),
///     Duration::from_secs(30),
/// )?;
/// let materials = gateway.get("/api/v1/materials/").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    http_client: reqwest::Client,
    base_url: url::Url,
    credentials: Arc<dyn CredentialStore>,
}

impl Gateway {
    /// Construct a gateway for `base_url`.
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`LearnmapError::Http`] if the HTTP client cannot be built
    /// (TLS backend initialisation failure).
    pub fn new(
        base_url: url::Url,
        credentials: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("learnmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LearnmapError::Http)?;

        Ok(Self {
            http_client,
            base_url,
            credentials,
        })
    }

    /// Construct a gateway from validated configuration.
    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::new(config.base_url()?, credentials, config.api.timeout())
    }

    /// The credential store this gateway reads from.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Authenticated `GET`.
    pub async fn get(&self, path: &str) -> Result<Value> {
        let req = self.request(Method::GET, path);
        self.execute(self.authorize(req), "GET", path).await
    }

    /// Authenticated `POST` with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).json(body);
        self.execute(self.authorize(req), "POST", path).await
    }

    /// Unauthenticated `POST` with a JSON body.
    pub async fn post_public<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).json(body);
        self.execute(req, "POST", path).await
    }

    /// Unauthenticated `POST` with an `application/x-www-form-urlencoded` body.
    pub async fn post_form_public(&self, path: &str, form: &[(&str, &str)]) -> Result<Value> {
        let req = self.request(Method::POST, path).form(form);
        self.execute(req, "POST", path).await
    }

    /// Full URL for an endpoint path.
    ///
    /// Paths are appended to the base URL verbatim, so a base with a path
    /// prefix (`https://host/learn`) keeps that prefix.
    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.endpoint(path))
            .header("Accept", "application/json")
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.read() {
            Some(pair) => req.header("Authorization", pair.authorization_header()),
            None => {
                tracing::debug!("No stored credential; sending request unauthenticated");
                req
            }
        }
    }

    async fn execute(&self, req: RequestBuilder, method: &str, path: &str) -> Result<Value> {
        tracing::debug!("{} {}", method, path);

        let response = req.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, path, e);
            LearnmapError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(LearnmapError::Http)?;

        if !status.is_success() {
            tracing::debug!("{} {} returned HTTP {}", method, path, status.as_u16());
            return Err(LearnmapError::Request {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| LearnmapError::Serialization(e).into())
    }
}
