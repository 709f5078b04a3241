//! Retrieving online documents with retry and backoff.
//!
//! [`Fetcher`] dispatches on the URL suffix (PDF vs HTML), sends browser-like
//! headers, and retries retryable network failures with exponential backoff.
//! It never surfaces an error to its caller: exhaustion and terminal failures
//! both come back as empty content, which the acquisition layer reports as
//! "could not be retrieved".

use super::extract::{ContentExtractor, DocumentKind, ExtractError, Payload};
use crate::types::{AppError, Result};
use crate::utils::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can turn a URL into document text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the extracted text, or an empty string when nothing could be retrieved.
    async fn fetch(&self, url: &str) -> String;
}

/// Failure of a single fetch attempt, classified for the retry loop.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection failures, HTTP error statuses and timeouts.
    #[error("retryable fetch failure: {0}")]
    Retryable(String),

    /// Everything else (bad URL, undecodable body, extraction failure).
    #[error("terminal fetch failure: {0}")]
    Terminal(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Retryable(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_status() || err.is_request() {
            FetchError::Retryable(err.to_string())
        } else {
            FetchError::Terminal(err.to_string())
        }
    }
}

impl From<ExtractError> for FetchError {
    fn from(err: ExtractError) -> Self {
        FetchError::Terminal(err.to_string())
    }
}

/// HTTP fetcher with retry/backoff and content extraction
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff_unit: Duration,
    extractor: ContentExtractor,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
        headers.insert(ACCEPT, header_value(&config.accept)?);

        // hyper's default header buffer already exceeds what oversized content
        // servers send; the flags below keep odd-but-harmless headers from
        // failing the whole response.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .http1_ignore_invalid_headers_in_responses(true)
            .http1_allow_obsolete_multiline_headers_in_responses(true)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retries: config.retries,
            backoff_unit: config.backoff_unit(),
            extractor: ContentExtractor::new(),
        })
    }

    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Number of retries after the first attempt
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Delay after failed attempt `attempt` (0-indexed): `unit * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// One attempt: GET, status check, extraction.
    ///
    /// HTML bodies are decoded with the charset from `Content-Type`,
    /// defaulting to UTF-8.
    pub async fn fetch_once(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let payload = match DocumentKind::from_url(url) {
            DocumentKind::Html => Payload::Html(response.text().await?),
            DocumentKind::Pdf => Payload::Pdf(response.bytes().await?.to_vec()),
        };
        debug!(url, kind = ?payload.kind(), "Fetched document body");

        let text = self.extractor.extract(payload, url).await?;
        Ok(text)
    }

    /// Run `attempt` until it succeeds, fails terminally or the retries run out.
    async fn with_backoff<F, Fut>(&self, url: &str, mut attempt: F) -> String
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<String, FetchError>>,
    {
        for n in 0..=self.retries {
            match attempt().await {
                Ok(text) => return text,
                Err(FetchError::Retryable(error)) => {
                    info!(url, attempt = n + 1, %error, "Fetch attempt failed");
                    if n < self.retries {
                        let delay = self.delay_for_attempt(n);
                        debug!(url, delay_ms = delay.as_millis() as u64, "Backing off");
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(url, attempts = n + 1, "All fetch retries failed");
                    }
                }
                Err(FetchError::Terminal(error)) => {
                    warn!(url, %error, "Non-retryable fetch error");
                    break;
                }
            }
        }

        String::new()
    }
}

#[async_trait]
impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> String {
        info!(url, "Attempting fetch");
        self.with_backoff(url, || self.fetch_once(url)).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Config(format!("Invalid header value '{}': {}", value, e)))
}
