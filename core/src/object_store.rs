//! Bucket client for the hosted object storage.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use serde::Serialize;

use crate::config::BackendConfig;
use crate::error::{Result, ensure_success};
use crate::models::Session;

const STORAGE_PATH: &str = "storage/v1";

/// Cache lifetime (seconds) requested for uploaded objects.
pub const UPLOAD_CACHE_SECONDS: u32 = 3600;

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

/// Objects in one bucket.
#[derive(Clone)]
pub struct Bucket {
    http: reqwest::Client,
    backend: Arc<BackendConfig>,
    name: String,
}

impl Bucket {
    pub fn new(http: reqwest::Client, backend: Arc<BackendConfig>, name: impl Into<String>) -> Self {
        Self {
            http,
            backend,
            name: name.into(),
        }
    }

    /// Uploads `bytes` under `key`. Refuses to overwrite an existing object.
    pub async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        session: &Session,
    ) -> Result<()> {
        let url = self
            .backend
            .endpoint(&format!("{STORAGE_PATH}/object/{}/{key}", self.name));
        tracing::debug!("POST {url} ({} bytes)", bytes.len());
        let response = self
            .http
            .post(url)
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, format!("max-age={UPLOAD_CACHE_SECONDS}"))
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response, "Upload failed").await?;
        Ok(())
    }

    /// Removes objects by key.
    pub async fn remove(&self, keys: &[String], session: &Session) -> Result<()> {
        let url = self
            .backend
            .endpoint(&format!("{STORAGE_PATH}/object/{}", self.name));
        tracing::debug!("DELETE {url} {keys:?}");
        let response = self
            .http
            .delete(url)
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .json(&RemoveRequest { prefixes: keys })
            .send()
            .await?;
        ensure_success(response, "Failed to remove file").await?;
        Ok(())
    }

    /// Public URL of `key`. Computed locally; no request is made.
    pub fn public_url(&self, key: &str) -> String {
        self.backend
            .endpoint(&format!("{STORAGE_PATH}/object/public/{}/{key}", self.name))
    }
}

/// Object key of a public URL: its last two path segments
/// (`<user-id>/<file>`). `None` when the URL has fewer than two segments.
pub fn key_from_public_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let file = segments.next()?;
    let dir = segments.next()?;
    Some(format!("{dir}/{file}"))
}
