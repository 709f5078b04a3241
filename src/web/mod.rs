//! Document acquisition from the web
//!
//! - [`search`] - query → ranked [`SearchResult`](crate::types::SearchResult) candidates
//! - [`fetcher`] - URL → text, with retry/backoff and failure classification
//! - [`extract`] - HTML/PDF payload → plain text
//!
//! ```ignore
//! let client = SearchClient::new(Arc::new(DuckDuckGoProvider::new()), &config.search);
//! let results = client.search(&Query::new("rust web scraping")).await?;
//!
//! let fetcher = Fetcher::new(&config.fetch)?;
//! let text = fetcher.fetch(&results[0].url).await; // "" when nothing could be retrieved
//! ```

/// HTML and PDF text extraction.
pub mod extract;
/// HTTP fetching with retry and backoff.
pub mod fetcher;
/// Search providers and the rate-limit aware search client.
pub mod search;

pub use extract::{ContentExtractor, DocumentKind, ExtractError};
pub use fetcher::{FetchError, Fetcher, PageFetcher};
pub use search::{
    BlockingSearchProvider, DuckDuckGoProvider, ProviderError, RawHit, SearchClient,
    SearchProvider,
};
