//! HTTP origin fetching.
//!
//! Provides the blocking HTTP client that retrieves templates from their
//! origin URL. Every failure mode (no URL, 404, timeout, refused
//! connection, rejected body) is reported to the pipeline as a plain miss.

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::postprocess::PostProcessor;
use crate::error::{ResolverError, Result};

/// Default origin request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// How the origin answered a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A (post-processed) body to cache.
    Body(String),
    /// The origin does not know the template.
    NotFound,
    /// No URL could be derived for the key; nothing was requested.
    Unresolved,
    /// Non-success status, only reported when error statuses are rejected.
    ErrorStatus(u16),
}

impl FetchOutcome {
    /// Extract the body, if any.
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Body(body) => Some(body),
            _ => None,
        }
    }
}

/// Fetches templates from their origin over HTTP/HTTPS.
#[derive(Clone)]
pub struct OriginFetcher {
    client: Client,
    timeout: Duration,
    reject_error_status: bool,
    post_processor: Option<Arc<dyn PostProcessor>>,
}

impl OriginFetcher {
    /// Create a fetcher with the default 5-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("template-resolver/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout,
            reject_error_status: false,
            post_processor: None,
        })
    }

    /// Register the post-processing hook run on every fetched body.
    pub fn with_post_processor(mut self, processor: impl PostProcessor + 'static) -> Self {
        self.post_processor = Some(Arc::new(processor));
        self
    }

    /// Treat non-2xx responses other than 404 as misses.
    ///
    /// Off by default: any non-404 body is a candidate template.
    pub fn reject_error_status(mut self, reject: bool) -> Self {
        self.reject_error_status = reject;
        self
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check if a post-processor is registered.
    pub fn has_post_processor(&self) -> bool {
        self.post_processor.is_some()
    }

    /// Fetch the template for `key` using the configured timeout.
    pub fn fetch(&self, key: &str, url: Option<&str>) -> Option<String> {
        self.fetch_with_timeout(key, url, self.timeout)
    }

    /// Fetch the template for `key`, absorbing every failure into `None`.
    pub fn fetch_with_timeout(
        &self,
        key: &str,
        url: Option<&str>,
        timeout: Duration,
    ) -> Option<String> {
        match self.try_fetch(key, url, timeout) {
            Ok(outcome) => outcome.into_body(),
            Err(e) => {
                error!("Origin fetch for '{}' failed: {}", key, e);
                None
            }
        }
    }

    /// Fetch the template for `key`, reporting failures as errors.
    ///
    /// Transport failures map to [`ResolverError::Http`]; a post-processor
    /// rejection is returned as-is.
    pub fn try_fetch(
        &self,
        key: &str,
        url: Option<&str>,
        timeout: Duration,
    ) -> Result<FetchOutcome> {
        let Some(url) = url else {
            debug!("No origin URL for '{}', skipping fetch", key);
            return Ok(FetchOutcome::Unresolved);
        };

        info!("Fetching remote template from {:?}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| http_error(url, e))?;

        let status = response.status();
        let body = response.text().map_err(|e| http_error(url, e))?;

        info!(
            "Got remote template response code {} ({} bytes)",
            status.as_u16(),
            body.len()
        );

        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }

        if self.reject_error_status && !status.is_success() {
            warn!("Ignoring origin response {} for '{}'", status.as_u16(), key);
            return Ok(FetchOutcome::ErrorStatus(status.as_u16()));
        }

        let body = match &self.post_processor {
            Some(processor) => processor.process(key, body)?,
            None => body,
        };

        Ok(FetchOutcome::Body(body))
    }
}

impl std::fmt::Debug for OriginFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginFetcher")
            .field("timeout", &self.timeout)
            .field("reject_error_status", &self.reject_error_status)
            .field("post_processor", &self.post_processor.is_some())
            .finish()
    }
}

fn http_error(url: &str, err: reqwest::Error) -> ResolverError {
    let message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };

    ResolverError::Http {
        url: url.to_string(),
        message,
    }
}
