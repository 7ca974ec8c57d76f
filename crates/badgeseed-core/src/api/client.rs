//! API client for a PostgREST-style table API (as hosted by Supabase).
//!
//! Every call is a single request; nothing is retried.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;

use super::{ApiError, Backend};

// ============================================================================
// Constants
// ============================================================================

/// Path of the table API below the project URL
const REST_PATH: &str = "rest/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound fetched by single-row lookups. Two is enough to tell "one"
/// from "more than one".
const LOOKUP_LIMIT: &str = "2";

/// API client for the hosted table API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the project at `config.url`, authenticating every
    /// request with `config.api_key`.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid backend URL '{}'", config.url))?;

        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(&config.api_key)
            .context("API key is not a valid header value")?;
        headers.insert("apikey", key);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .context("API key is not a valid header value")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Escape `value` so an `ilike` filter matches it literally, ignoring case.
///
/// `%` and `_` are escaped with a backslash. The table API turns `*` into
/// `%` before the backslash is seen, so `*` cannot be escaped and is sent
/// as the single-character wildcard `_` instead.
fn ilike_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl Backend for ApiClient {
    async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, ApiError> {
        let url = self.table_url(table);
        debug!(table = table, row = %row, "POST");

        let response = self
            .client
            .post(&url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::read_rows(response).await
    }

    async fn select_one_ilike(
        &self,
        table: &str,
        select: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.table_url(table);
        let filter = format!("ilike.{}", ilike_literal(value));
        debug!(table = table, select = select, column = column, filter = %filter, "GET");

        let response = self
            .client
            .get(&url)
            .query(&[("select", select), (column, filter.as_str()), ("limit", LOOKUP_LIMIT)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let mut rows = Self::read_rows(response).await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(ApiError::InvalidResponse(format!(
                "expected at most one {} row where {} matches '{}', got {}",
                table, column, value, n
            ))),
        }
    }
}
