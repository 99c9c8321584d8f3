//! Login, signup and logout
//!
//! [`AuthService`] is the only writer of the credential store:
//!
//! - [`AuthService::login`] posts the form-encoded `username`/`password`
//!   pair and saves the returned [`CredentialPair`].
//! - [`AuthService::signup`] posts a JSON [`SignupRequest`] and saves the
//!   returned pair.
//! - [`AuthService::logout`] asks the server to invalidate the refresh token
//!   (best-effort) and then clears the local credential no matter what.

use crate::api::decode;
use crate::error::{LearnmapError, Result};
use crate::gateway::Gateway;
use crate::models::{CredentialPair, LogoutRequest, SignupRequest};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const SIGNUP_PATH: &str = "/api/v1/auth/signup";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Outcome of [`AuthService::logout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The server accepted the refresh-token invalidation
    Invalidated,
    /// No refresh token was stored, so no request was sent
    NothingToInvalidate,
    /// The invalidation request failed; the local credential was cleared anyway
    InvalidationFailed,
}

/// Authentication workflow over a [`Gateway`] and its credential store.
#[derive(Debug, Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Whether a credential is currently stored.
    pub fn is_logged_in(&self) -> bool {
        self.gateway.credentials().read().is_some()
    }

    /// Log in with email and password and store the returned credential.
    ///
    /// # Errors
    ///
    /// Returns [`LearnmapError::Authentication`] when the server rejects the
    /// credentials with a 401, the gateway error for other failures, and a
    /// store error if the credential cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair> {
        tracing::info!("Logging in as {}", email);
        // The server's login form names the email field `username`.
        let value = self
            .gateway
            .post_form_public(LOGIN_PATH, &[("username", email), ("password", password)])
            .await
            .map_err(reject_as_authentication)?;
        self.store(value, "login response")
    }

    /// Create an account and store the returned credential.
    ///
    /// A blank `name` is sent as `null`.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<CredentialPair> {
        tracing::info!("Signing up {}", email);
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };
        let value = self.gateway.post_public(SIGNUP_PATH, &body).await?;
        self.store(value, "signup response")
    }

    /// Invalidate the refresh token server-side and clear the local credential.
    ///
    /// The local clear happens even if the server call fails; only a failure
    /// to clear local storage is returned as an error.
    pub async fn logout(&self) -> Result<LogoutOutcome> {
        let refresh_token = self
            .gateway
            .credentials()
            .read()
            .and_then(|pair| pair.refresh_token);

        let outcome = match refresh_token {
            None => LogoutOutcome::NothingToInvalidate,
            Some(refresh_token) => {
                let body = LogoutRequest { refresh_token };
                match self.gateway.post_public(LOGOUT_PATH, &body).await {
                    Ok(_) => LogoutOutcome::Invalidated,
                    Err(e) => {
                        tracing::warn!("Server-side logout failed: {}", e);
                        LogoutOutcome::InvalidationFailed
                    }
                }
            }
        };

        self.gateway.credentials().clear()?;
        tracing::info!("Local credential cleared ({:?})", outcome);
        Ok(outcome)
    }

    fn store(&self, value: serde_json::Value, what: &str) -> Result<CredentialPair> {
        let pair: CredentialPair = decode(value, what)?;
        self.gateway.credentials().save(&pair)?;
        Ok(pair)
    }
}

fn reject_as_authentication(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<LearnmapError>() {
        Some(LearnmapError::Request { status: 401, body }) => {
            LearnmapError::Authentication(format!("login rejected: {}", body)).into()
        }
        _ => err,
    }
}
