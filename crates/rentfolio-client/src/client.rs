//! HTTP client for the Rentfolio backend.
//!
//! Every request carries the configured `X-API-Key` header and a fixed
//! timeout ceiling. All transport and HTTP failures are normalized into
//! [`ApiError`]; nothing in this module panics across the public boundary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rentfolio_client::ClientBuilder;
//!
//! # fn example() -> rentfolio_common::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("https://api.example.com/v1")
//!     .api_key("k-123")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use rentfolio_common::{ApiError, Config, Result};
use rentfolio_core::pagination::{PageRequest, PageResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Default timeout ceiling for API requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST client for the property-management backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    fn new(base_url: String, api_key: &str, timeout: Duration, connect_timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            let value = HeaderValue::from_str(api_key).map_err(|_| {
                ApiError::validation("API key contains characters not valid in a header")
            })?;
            headers.insert("X-API-Key", value);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers);
        if let Some(connect) = connect_timeout {
            builder = builder.connect_timeout(connect);
        }
        let http_client = builder.build().map_err(|e| ApiError::Internal {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            http_client,
            base_url,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Build a client straight from process configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        ClientBuilder::default()
            .base_url(&config.base_url)
            .api_key(&config.api_key)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Generic request helpers =====

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http_client.get(self.url(path));
        let response = self.send("GET", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self.http_client.get(self.url(path)).query(query);
        let response = self.send("GET", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.http_client.post(self.url(path)).json(body);
        let response = self.send("POST", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let request = self.http_client.post(self.url(path)).json(body);
        self.send("POST", path, request).await?;
        Ok(())
    }

    pub(crate) async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.http_client.put(self.url(path)).json(body);
        let response = self.send("PUT", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let request = self.http_client.delete(self.url(path));
        self.send("DELETE", path, request).await?;
        Ok(())
    }

    pub(crate) async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let request = self.http_client.post(self.url(path)).multipart(form);
        let response = self.send("POST", path, request).await?;
        Self::decode(response).await
    }

    /// Fetch one page of a list endpoint, adapting either the standard
    /// paging envelope or a bare array.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
        page: PageRequest,
    ) -> Result<PageResult<T>> {
        query.push(("page", page.page.to_string()));
        query.push(("limit", page.limit.to_string()));
        let envelope: ListEnvelope<T> = self.get_query(path, &query).await?;
        Ok(envelope.into())
    }

    // ===== Wire plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Issue a request, log it, and surface non-2xx statuses as errors.
    async fn send(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method, path, "api request");
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!(method, path, status = status.as_u16(), "api response");

        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::error_for_status(status, response.text().await.unwrap_or_default()))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json().await.map_err(|e| ApiError::Internal {
            message: format!("malformed response body: {e}"),
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            ApiError::Network {
                message: error.to_string(),
            }
        }
    }

    /// Map an HTTP error status onto the taxonomy, preferring a message
    /// from the error body when one is present.
    fn error_for_status(status: StatusCode, body: String) -> ApiError {
        let message = ErrorBody::message_from(&body)
            .unwrap_or_else(|| ApiError::message_for_status(status.as_u16()).to_string());

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound { resource: message },
            s if s.is_client_error() => ApiError::Client {
                status: s.as_u16(),
                message,
            },
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Internal {
                message: format!("request failed with status {s}: {message}"),
            },
        }
    }
}

/// Error body shapes the backend is known to produce.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn message_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed.message.or(parsed.error)
    }
}

/// List responses arrive either as a paging envelope or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Page {
        items: Vec<T>,
        #[serde(alias = "totalItems")]
        total_items: u64,
        #[serde(alias = "totalPages")]
        total_pages: u32,
    },
    Bare(Vec<T>),
}

impl<T> From<ListEnvelope<T>> for PageResult<T> {
    fn from(envelope: ListEnvelope<T>) -> Self {
        match envelope {
            ListEnvelope::Page {
                items,
                total_items,
                total_pages,
            } => PageResult {
                items,
                total_items,
                total_pages,
            },
            ListEnvelope::Bare(items) => PageResult::single_page(items),
        }
    }
}

/// Builder for constructing an [`ApiClient`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ApiError::validation("base_url is required"))?;
        url::Url::parse(&base_url)
            .map_err(|e| ApiError::validation(format!("invalid base_url: {e}")))?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        ApiClient::new(
            base_url,
            self.api_key.as_deref().unwrap_or_default(),
            timeout,
            self.connect_timeout,
        )
    }
}
