//! Web search with rate-limit retry.
//!
//! The [`SearchClient`] wraps a [`SearchProvider`] (DuckDuckGo through `daedra`
//! by default) and turns raw provider hits into [`SearchResult`]s. Only rate
//! limiting is retried, with a delay that grows linearly per attempt; any other
//! provider failure is returned immediately.

use crate::types::{AppError, Query, Result, SearchResult};
use crate::utils::config::{MalformedHitPolicy, SearchConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const RATE_LIMIT_MARKERS: &[&str] = &["ratelimit", "rate limit", "rate-limit", "too many requests", "429"];

/// A hit as the provider hands it over; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "url")]
    pub href: Option<String>,
    #[serde(default, alias = "description")]
    pub body: Option<String>,
}

impl RawHit {
    pub fn new(title: &str, href: &str, body: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            href: Some(href.to_string()),
            body: Some(body.to_string()),
        }
    }

    /// `None` when title, url or excerpt is missing or blank.
    pub fn into_result(self) -> Option<SearchResult> {
        fn present(field: Option<String>) -> Option<String> {
            field.filter(|v| !v.trim().is_empty())
        }

        Some(SearchResult {
            title: present(self.title)?,
            url: present(self.href)?,
            excerpt: present(self.body)?,
        })
    }
}

impl From<daedra::SearchResult> for RawHit {
    fn from(result: daedra::SearchResult) -> Self {
        Self {
            title: Some(result.title),
            href: Some(result.url),
            body: Some(result.description),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Classify a provider error message as rate limiting or not.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
            ProviderError::RateLimited(message)
        } else {
            ProviderError::Other(message)
        }
    }
}

/// Index lookup boundary: query text in, ordered raw hits out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<RawHit>, ProviderError>;
}

/// DuckDuckGo search powered by daedra
pub struct DuckDuckGoProvider;

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<RawHit>, ProviderError> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .into_iter()
                .map(RawHit::from)
                .collect()),
            Err(e) => Err(ProviderError::classify(e.to_string())),
        }
    }
}

type BlockingSearchFn =
    dyn Fn(&str, usize) -> std::result::Result<Vec<RawHit>, ProviderError> + Send + Sync;

/// Adapter for synchronous search libraries.
///
/// Each call runs on tokio's blocking pool so the async workers stay free
/// while the library waits on the network.
pub struct BlockingSearchProvider {
    name: String,
    search_fn: Arc<BlockingSearchFn>,
}

impl BlockingSearchProvider {
    pub fn new<F>(name: impl Into<String>, search_fn: F) -> Self
    where
        F: Fn(&str, usize) -> std::result::Result<Vec<RawHit>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            search_fn: Arc::new(search_fn),
        }
    }
}

#[async_trait]
impl SearchProvider for BlockingSearchProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<RawHit>, ProviderError> {
        let search_fn = Arc::clone(&self.search_fn);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || search_fn(&query, max_results))
            .await
            .map_err(|e| ProviderError::Other(format!("search worker failed: {}", e)))?
    }
}

/// Search client with bounded hit count and rate-limit backoff
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    max_hits: usize,
    retries: u32,
    backoff_base: Duration,
    timeout: Duration,
    malformed_hits: MalformedHitPolicy,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>, config: &SearchConfig) -> Self {
        Self {
            provider,
            max_hits: config.max_hits,
            retries: config.retries,
            backoff_base: config.rate_limit_backoff(),
            timeout: config.timeout(),
            malformed_hits: config.malformed_hits,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Delay after rate-limited attempt `attempt` (0-indexed): `base * (1 + attempt)`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt.saturating_add(1))
    }

    pub async fn search(&self, query: &Query) -> Result<Vec<SearchResult>> {
        let mut attempt: u32 = 0;
        loop {
            let outcome = match tokio::time::timeout(
                self.timeout,
                self.provider.search(&query.text, self.max_hits),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderError::Other(format!(
                    "search timed out after {}s",
                    self.timeout.as_secs()
                ))),
            };

            match outcome {
                Ok(hits) => return self.collect_results(query, hits),
                Err(ProviderError::RateLimited(message)) if attempt < self.retries => {
                    let delay = self.backoff_for_attempt(attempt);
                    warn!(
                        query = %query,
                        attempt = attempt + 1,
                        retries = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        %message,
                        "Search rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(ProviderError::RateLimited(message)) => {
                    return Err(AppError::RateLimited {
                        attempts: attempt + 1,
                        message,
                    });
                }
                Err(ProviderError::Other(message)) => {
                    return Err(AppError::SearchProvider(message));
                }
            }
        }
    }

    fn collect_results(&self, query: &Query, hits: Vec<RawHit>) -> Result<Vec<SearchResult>> {
        let n_raw = hits.len();
        let mut results = Vec::with_capacity(n_raw.min(self.max_hits));

        for (index, hit) in hits.into_iter().enumerate() {
            match hit.into_result() {
                Some(result) => results.push(result),
                None => match self.malformed_hits {
                    MalformedHitPolicy::Skip => {
                        warn!(query = %query, index, "Skipping malformed search hit");
                    }
                    MalformedHitPolicy::FailFast => {
                        return Err(AppError::SearchProvider(format!(
                            "hit {} for '{}' is missing a title, url or excerpt",
                            index, query
                        )));
                    }
                },
            }
        }

        results.truncate(self.max_hits);
        info!(query = %query, n_raw, n_results = results.len(), "Search complete");
        Ok(results)
    }
}
