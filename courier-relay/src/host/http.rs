//! HTTP client with tracing.
//!
//! Thin wrapper around `reqwest` that adds request/response tracing and the
//! handful of request shapes relay APIs need: JSON bodies with custom auth
//! headers, and form bodies with basic auth.

use reqwest::{Client, Response, header::HeaderMap};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::context::DEFAULT_RELAY_TIMEOUT;
use crate::error::HttpError;

/// User agent string for Courier.
const USER_AGENT: &str = concat!("Courier/", env!("CARGO_PKG_VERSION"));

/// Longest response body kept in error details.
const MAX_BODY_EXCERPT: usize = 200;

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the default relay timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_RELAY_TIMEOUT)
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, using defaults");
                Client::new()
            });

        Self { inner }
    }

    /// Joins `path` onto `base`, keeping any path prefix on the base.
    pub fn join(base: &str, path: &str) -> Result<String, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))
    }

    /// Performs a POST request with a JSON body and extra headers.
    #[instrument(skip(self, headers, body), fields(url = %url))]
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with JSON");

        let response = self.inner.post(url).headers(headers).json(body).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with form data and basic auth.
    #[instrument(skip(self, password, form), fields(url = %url))]
    pub async fn post_form_basic_auth<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        username: &str,
        password: &str,
        form: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with form data");

        let response = self
            .inner
            .post(url)
            .basic_auth(username, Some(password))
            .form(form)
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the relay refused the credentials.
    fn is_auth_failure(&self) -> bool;
}

impl ResponseExt for Response {
    fn is_auth_failure(&self) -> bool {
        matches!(
            self.status(),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        )
    }
}

/// Shortens a response body for use in an error detail.
pub fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
