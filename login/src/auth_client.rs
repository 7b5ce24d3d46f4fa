//! Auth service client.
//!
//! Endpoints under `/auth/v1`:
//! 1. `POST /token?grant_type=password` with `{email, password}`
//! 2. `POST /token?grant_type=refresh_token` with `{refresh_token}`
//! 3. `GET /user`
//! 4. `POST /logout`

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use taskpad_core::BackendConfig;
use taskpad_core::models::{Session, User};
use thiserror::Error;

const AUTH_PATH: &str = "auth/v1";

/// Auth flow errors
#[derive(Debug, Error)]
pub enum LoginError {
    /// Email or password left blank; no request was sent.
    #[error("Email and password are required")]
    MissingCredentials,

    /// The auth service refused the request.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected auth response: {0}")]
    Parse(String),

    #[error("session storage: {0}")]
    Storage(#[from] crate::session_storage::StorageError),
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    expires_in: Option<i64>,
    /// Absolute expiry (unix seconds); preferred over `expires_in`
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self.expires_at.or_else(|| {
            self.expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Picks the human-readable part of an auth error body.
fn rejection_message(body: &str) -> String {
    let fallback = "Authentication failed";
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback.to_string();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .find(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Client for the hosted auth service.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    backend: Arc<BackendConfig>,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, backend: Arc<BackendConfig>) -> Self {
        Self { http, backend }
    }

    fn endpoint(&self, path: &str) -> String {
        self.backend.endpoint(&format!("{AUTH_PATH}/{path}"))
    }

    /// Sign in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, LoginError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }
        let session = self
            .token("password", &PasswordGrant { email, password })
            .await?;
        tracing::info!("signed in as {}", session.user.id);
        Ok(session)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, LoginError> {
        self.token("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn token<B: Serialize>(&self, grant_type: &str, body: &B) -> Result<Session, LoginError> {
        let url = self.endpoint("token");
        tracing::debug!("POST {url} grant_type={grant_type}");
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.backend.anon_key)
            .json(body)
            .send()
            .await?;
        let response = check(response).await?;
        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| LoginError::Parse(e.to_string()))?;
        Ok(token.into_session())
    }

    /// The user that owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<User, LoginError> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        check(response)
            .await?
            .json::<User>()
            .await
            .map_err(|e| LoginError::Parse(e.to_string()))
    }

    /// Revoke the session server-side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), LoginError> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, LoginError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("auth request failed with {status}: {body}");
    Err(LoginError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&body),
    })
}
