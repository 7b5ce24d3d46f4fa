//! Client for the hosted serverless functions: subtask suggestions, semantic
//! search and embedding generation.
//!
//! Every call looks the session up immediately before sending. Without a
//! session the call fails with [`TaskpadError::NotAuthenticated`] and no
//! request leaves the process.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::{Result, TaskpadError, ensure_function_success};
use crate::models::SearchResult;
use crate::session::{SessionProvider, require_session};

const FUNCTIONS_PATH: &str = "functions/v1";

pub const GENERATE_SUBTASKS_FN: &str = "generate-subtasks";
pub const SEMANTIC_SEARCH_FN: &str = "semantic-search";
pub const GENERATE_EMBEDDING_FN: &str = "generate-task-embedding";

/// AI-backed operations offered by the platform.
#[async_trait]
pub trait Augmentation: Send + Sync {
    /// Suggested subtask titles for a task.
    async fn generate_subtasks(&self, task_id: &str, task_title: &str) -> Result<Vec<String>>;

    /// Tasks ranked by similarity to `query`.
    async fn semantic_search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Computes and stores the embedding for a task. The response carries
    /// nothing the caller needs.
    async fn generate_embedding(&self, task_id: &str, task_title: &str) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubtasksRequest<'a> {
    task_title: &'a str,
}

#[derive(Deserialize)]
struct SubtasksResponse {
    #[serde(default)]
    subtasks: Vec<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingRequest<'a> {
    task_id: &'a str,
    task_title: &'a str,
}

/// [`Augmentation`] over HTTP.
pub struct FunctionsClient {
    http: reqwest::Client,
    backend: Arc<BackendConfig>,
    sessions: Arc<dyn SessionProvider>,
}

impl FunctionsClient {
    pub fn new(
        http: reqwest::Client,
        backend: Arc<BackendConfig>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            http,
            backend,
            sessions,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        self.backend.endpoint(&format!("{FUNCTIONS_PATH}/{name}"))
    }

    async fn invoke<B: Serialize + ?Sized>(
        &self,
        name: &str,
        body: &B,
        fallback: &str,
    ) -> Result<reqwest::Response> {
        let session = require_session(self.sessions.as_ref()).await?;
        let url = self.endpoint(name);
        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .json(body)
            .send()
            .await?;
        ensure_function_success(response, fallback).await
    }

    async fn invoke_json<B, T>(&self, name: &str, body: &B, fallback: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.invoke(name, body, fallback).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TaskpadError::Parse(format!("{name}: {e}")))
    }
}

#[async_trait]
impl Augmentation for FunctionsClient {
    async fn generate_subtasks(&self, task_id: &str, task_title: &str) -> Result<Vec<String>> {
        tracing::debug!("requesting subtask suggestions for task {task_id}");
        let response: SubtasksResponse = self
            .invoke_json(
                GENERATE_SUBTASKS_FN,
                &SubtasksRequest { task_title },
                "Failed to generate subtasks",
            )
            .await?;
        Ok(response
            .subtasks
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    async fn semantic_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response: SearchResponse = self
            .invoke_json(SEMANTIC_SEARCH_FN, &SearchRequest { query }, "Search failed")
            .await?;
        Ok(response.results)
    }

    async fn generate_embedding(&self, task_id: &str, task_title: &str) -> Result<()> {
        self.invoke(
            GENERATE_EMBEDDING_FN,
            &EmbeddingRequest {
                task_id,
                task_title,
            },
            "Failed to generate embedding",
        )
        .await?;
        Ok(())
    }
}
