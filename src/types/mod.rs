use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Research Input Types =============

/// A free-text query used for web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Natural language question or keyword terms.
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// A single hit returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the webpage or online document.
    pub title: String,
    /// URL of the webpage or online document.
    pub url: String,
    /// Short description from the search engine.
    pub excerpt: String,
}

// ============= Knowledge Base Types =============

/// A text document, potentially fetched from an online source.
///
/// Equality is structural over title, url and text; the knowledge base
/// relies on it for duplicate suppression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    pub title: String,
    /// Empty when the document was not web-sourced.
    #[serde(default)]
    pub url: String,
    pub text: String,
}

impl Doc {
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            text: text.into(),
        }
    }

    /// Number of characters (not bytes) in the document text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Search provider error: {0}")]
    SearchProvider(String),

    #[error("Search provider rate limit persisted after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },

    #[error("Summarization failed for '{title}': {reason}")]
    Summarization { title: String, reason: String },

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Take at most `max_chars` characters from the start of `text`.
///
/// Slices on a char boundary so multi-byte text never panics.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
