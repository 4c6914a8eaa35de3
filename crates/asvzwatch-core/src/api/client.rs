//! API client for the PocketBase REST API.
//!
//! This module provides the `ApiClient` struct for paged and full-list
//! collection queries, first-match lookups, file URLs and password auth.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionData;

use super::{collections, ApiError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size used when walking every page of a collection.
/// 500 is the largest `perPage` PocketBase accepts.
const FULL_LIST_BATCH_SIZE: u32 = 500;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Optional filter and sort applied to a collection listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter expression. Empty expressions are dropped.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    /// Set the sort expression, e.g. `-created` or `timestamp`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    fn params(&self, page: u32, per_page: u32, skip_total: bool) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string()), ("perPage", per_page.to_string())];
        if skip_total {
            params.push(("skipTotal", "1".to_string()));
        }
        if let Some(ref filter) = self.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(ref sort) = self.sort {
            params.push(("sort", sort.clone()));
        }
        params
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage<T> {
    pub page: u32,
    #[serde(rename = "perPage")]
    pub per_page: u32,
    /// -1 when the request was made with `skipTotal`
    #[serde(rename = "totalItems", default)]
    pub total_items: i64,
    #[serde(rename = "totalPages", default)]
    pub total_pages: i64,
    pub items: Vec<T>,
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    identity: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    record: AuthRecord,
}

#[derive(Debug, Deserialize)]
struct AuthRecord {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// API client for the PocketBase backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the auth token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Authenticate against the `users` collection and return session data
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = format!(
            "{}/api/collections/{}/auth-with-password",
            self.base_url,
            collections::USERS
        );

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&AuthRequest {
                identity: email,
                password,
            })
            .send()
            .await
            .context("Failed to send authentication request")?;

        let response = Self::check_response(response).await?;

        let auth: AuthResponse = response
            .json()
            .await
            .context("Failed to parse auth response")?;

        debug!(user_id = %auth.record.id, "Authenticated");

        Ok(SessionData {
            token: auth.token,
            user_id: auth.record.id,
            email: auth.record.email.unwrap_or_else(|| email.to_string()),
            created_at: Utc::now(),
        })
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(header::AUTHORIZATION, header::HeaderValue::from_str(token)?);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .query(params)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    // ===== Collection Queries =====

    /// Fetch one page of a collection (1-based page index)
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        query: &ListQuery,
    ) -> Result<ListPage<T>> {
        let url = self.records_url(collection);
        self.get(&url, &query.params(page, per_page, false)).await
    }

    /// Fetch every record of a collection matching `query`, walking pages
    /// until a short page comes back
    pub async fn get_full_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<Vec<T>> {
        let url = self.records_url(collection);
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let params = query.params(page, FULL_LIST_BATCH_SIZE, true);
            let batch: ListPage<T> = self.get(&url, &params).await?;
            let count = batch.items.len();
            all.extend(batch.items);

            if count < FULL_LIST_BATCH_SIZE as usize {
                break;
            }
            page += 1;
        }

        debug!(collection = collection, count = all.len(), pages = page, "Fetched full list");
        Ok(all)
    }

    /// Fetch the first record matching `filter`, or `ApiError::NotFound`
    pub async fn get_first_list_item<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &str,
    ) -> Result<T> {
        let url = self.records_url(collection);
        let query = ListQuery::new().filter(filter);
        let page: ListPage<T> = self.get(&url, &query.params(1, 1, true)).await?;

        page.items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{} where {}", collection, filter)).into())
    }

    /// Build the public URL of a file attached to a record
    pub fn file_url(&self, collection: &str, record_id: &str, filename: &str) -> String {
        if let Ok(mut url) = Url::parse(&self.base_url) {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments
                    .pop_if_empty()
                    .extend(["api", "files", collection, record_id, filename]);
            }
            return url.to_string();
        }
        format!(
            "{}/api/files/{}/{}/{}",
            self.base_url, collection, record_id, filename
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
