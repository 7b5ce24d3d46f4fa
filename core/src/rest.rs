//! Minimal client for the hosted relational store's REST interface.
//!
//! Queries filter with `column=eq.value`, order with `order=column.asc|desc`
//! and ask for the affected rows back via `Prefer: return=representation`.
//! Row-level security on the server scopes every table to its owner; the
//! stores built on this client add an explicit owner filter as well.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::{Result, TaskpadError, ensure_success};
use crate::models::Session;

const REST_PATH: &str = "rest/v1";

const RETURN_REPRESENTATION: &str = "return=representation";
const IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=representation";

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

/// Entry point for table queries.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    backend: Arc<BackendConfig>,
}

impl RestClient {
    pub fn new(http: reqwest::Client, backend: Arc<BackendConfig>) -> Self {
        Self { http, backend }
    }

    /// Starts a query against `table`.
    pub fn from(&self, table: &str) -> Query<'_> {
        Query {
            client: self,
            table: table.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        session: &Session,
    ) -> reqwest::RequestBuilder {
        let url = self.backend.endpoint(&format!("{REST_PATH}/{table}"));
        tracing::debug!("{method} {url}");
        self.http
            .request(method, url)
            .header("apikey", &self.backend.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
    }
}

/// A pending query. Nothing is sent until one of the terminal methods runs.
pub struct Query<'a> {
    client: &'a RestClient,
    table: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
}

impl<'a> Query<'a> {
    /// Restricts to rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.order.push(format!("{column}.{}", direction.as_str()));
        self
    }

    fn params(&self, select: bool) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        if select {
            params.push(("select".to_string(), "*".to_string()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        params
    }

    fn require_filter(&self, verb: &str) -> Result<()> {
        if self.filters.is_empty() {
            return Err(TaskpadError::Invalid(format!(
                "refusing to {verb} {} without a filter",
                self.table
            )));
        }
        Ok(())
    }

    /// Fetches every matching row.
    pub async fn select<T: DeserializeOwned>(self, session: &Session) -> Result<Vec<T>> {
        let response = self
            .client
            .request(reqwest::Method::GET, &self.table, session)
            .query(&self.params(true))
            .send()
            .await?;
        let response = ensure_success(response, &fallback("load", &self.table)).await?;
        parse_rows(response).await
    }

    /// Fetches at most one row; zero rows is `Ok(None)`.
    pub async fn maybe_single<T: DeserializeOwned>(self, session: &Session) -> Result<Option<T>> {
        let table = self.table.clone();
        let mut rows = self.select::<T>(session).await?;
        if rows.len() > 1 {
            return Err(TaskpadError::Parse(format!(
                "expected at most one {table} row, got {}",
                rows.len()
            )));
        }
        Ok(rows.pop())
    }

    /// Inserts one row and returns what the server stored.
    pub async fn insert<B, T>(self, body: &B, session: &Session) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .request(reqwest::Method::POST, &self.table, session)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response, &fallback("create", &self.table)).await?;
        let mut rows: Vec<T> = parse_rows(response).await?;
        rows.pop()
            .ok_or_else(|| TaskpadError::Parse(format!("insert into {} returned no row", self.table)))
    }

    /// Inserts one row unless a row with the same `on_conflict` key exists.
    ///
    /// A single request; the server resolves the race. Returns the inserted
    /// row, or `None` when the row already existed.
    pub async fn insert_if_absent<B, T>(
        self,
        body: &B,
        on_conflict: &str,
        session: &Session,
    ) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .request(reqwest::Method::POST, &self.table, session)
            .query(&[("on_conflict", on_conflict)])
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", IGNORE_DUPLICATES)
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response, &fallback("create", &self.table)).await?;
        let mut rows: Vec<T> = parse_rows(response).await?;
        Ok(rows.pop())
    }

    /// Patches every matching row and returns the updated rows.
    pub async fn update<B, T>(self, body: &B, session: &Session) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require_filter("update")?;
        let response = self
            .client
            .request(reqwest::Method::PATCH, &self.table, session)
            .query(&self.params(false))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response, &fallback("update", &self.table)).await?;
        parse_rows(response).await
    }

    pub async fn delete(self, session: &Session) -> Result<()> {
        self.require_filter("delete")?;
        let response = self
            .client
            .request(reqwest::Method::DELETE, &self.table, session)
            .query(&self.params(false))
            .send()
            .await?;
        ensure_success(response, &fallback("delete", &self.table)).await?;
        Ok(())
    }
}

fn fallback(verb: &str, table: &str) -> String {
    format!("Failed to {verb} {table}")
}

async fn parse_rows<T: DeserializeOwned>(response: reqwest::Response) -> Result<Vec<T>> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&body).map_err(|e| TaskpadError::Parse(e.to_string()))
}
