//! Acquisition orchestrator: candidate in, status message out.
//!
//! Fetch, extract, gate and insert are chained here, and every failure along
//! the way is turned into an [`AcquireOutcome`] whose `Display` text is what
//! the agent loop reads. Nothing in this module returns an error.

use crate::knowledge::{Insertion, KnowledgeBase, SummarizationGate};
use crate::types::{char_prefix, Doc, SearchResult};
use crate::web::PageFetcher;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// A document to acquire: a bare URL or a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub url: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
}

impl Candidate {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Build from tool-call arguments.
    ///
    /// `url` may be a string or a search-result object; top-level `title` and
    /// `excerpt` fill in whatever the object did not carry.
    pub fn from_tool_args(args: &Value) -> Self {
        fn text(value: Option<&Value>) -> Option<String> {
            value
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        let mut candidate = match args.get("url") {
            Some(Value::Object(result)) => Candidate {
                url: text(result.get("url").or_else(|| result.get("href"))),
                title: text(result.get("title")),
                excerpt: text(result.get("excerpt").or_else(|| result.get("body"))),
            },
            other => Candidate {
                url: text(other),
                ..Default::default()
            },
        };
        candidate.title = candidate.title.or_else(|| text(args.get("title")));
        candidate.excerpt = candidate.excerpt.or_else(|| text(args.get("excerpt")));
        candidate
    }
}

impl From<&str> for Candidate {
    fn from(url: &str) -> Self {
        Candidate::url(url)
    }
}

impl From<String> for Candidate {
    fn from(url: String) -> Self {
        Candidate::url(url)
    }
}

impl From<SearchResult> for Candidate {
    fn from(result: SearchResult) -> Self {
        Self {
            url: Some(result.url),
            title: Some(result.title),
            excerpt: Some(result.excerpt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    MissingUrl,
    NotRetrieved {
        title: String,
        url: String,
    },
    AlreadyPresent {
        title: String,
        url: String,
    },
    SummarizationFailed {
        title: String,
        url: String,
        reason: String,
    },
    Added {
        title: String,
        url: String,
        snippet: String,
        n_docs: usize,
    },
}

impl AcquireOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AcquireOutcome::Added { .. })
    }
}

impl fmt::Display for AcquireOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireOutcome::MissingUrl => f.write_str(
                "Error: `fetch_online_doc` requires a `url` (a web address or a search result \
                 with a url). Please call it again with the url of the document to download.",
            ),
            AcquireOutcome::NotRetrieved { title, url } => {
                write!(f, "Document {} - {} couldn't be retrieved, ignoring it.", title, url)
            }
            AcquireOutcome::AlreadyPresent { title, url } => {
                write!(f, "Document {} ({}) is already in Knowledge Base.", title, url)
            }
            AcquireOutcome::SummarizationFailed { title, url, reason } => write!(
                f,
                "Document {} ({}) was retrieved but is too long to store and could not be \
                 summarized ({}); ignoring it.",
                title, url, reason
            ),
            AcquireOutcome::Added {
                title,
                url,
                snippet,
                n_docs,
            } => {
                write!(f, "Downloaded and added {}", title)?;
                if url != title {
                    write!(f, " ({})", url)?;
                }
                write!(
                    f,
                    ". Snippet:'{}...'\nThere are now {} documents in knowledge base.",
                    snippet, n_docs
                )
            }
        }
    }
}

/// Fetch → gate → insert.
pub struct DocumentAcquirer {
    fetcher: Arc<dyn PageFetcher>,
    gate: SummarizationGate,
    snippet_chars: usize,
}

impl DocumentAcquirer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, gate: SummarizationGate, snippet_chars: usize) -> Self {
        Self {
            fetcher,
            gate,
            snippet_chars,
        }
    }

    /// Acquire `candidate` into `knowledge`.
    ///
    /// The lock is only held to check for and insert the document, never
    /// across the fetch or the summarization call.
    pub async fn acquire(
        &self,
        knowledge: &Mutex<KnowledgeBase>,
        candidate: impl Into<Candidate>,
    ) -> AcquireOutcome {
        let candidate = candidate.into();
        let Some(url) = candidate.url.filter(|u| !u.trim().is_empty()) else {
            warn!("fetch_online_doc called without a url");
            return AcquireOutcome::MissingUrl;
        };
        let title = candidate.title.unwrap_or_else(|| url.clone());

        let text = self.fetcher.fetch(&url).await;
        if text.trim().is_empty() {
            warn!(%url, %title, "No content retrieved");
            return AcquireOutcome::NotRetrieved { title, url };
        }

        let doc = Doc::new(title.clone(), url.clone(), text);
        if knowledge.lock().await.contains(&doc) {
            info!(%url, "Skipping document already in knowledge base");
            return AcquireOutcome::AlreadyPresent { title, url };
        }

        let admitted = match self.gate.admit(doc.clone()).await {
            Ok(admitted) => admitted,
            Err(e) => {
                warn!(%url, error = %e, "Summarization failed");
                return AcquireOutcome::SummarizationFailed {
                    title,
                    url,
                    reason: e.to_string(),
                };
            }
        };

        let snippet = char_prefix(&admitted.text, self.snippet_chars).to_string();
        let insertion = {
            let mut kb = knowledge.lock().await;
            if admitted == doc {
                kb.insert(admitted)
            } else {
                kb.insert_summarized(&doc, admitted)
            }
        };

        match insertion {
            Insertion::Added { n_docs } => AcquireOutcome::Added {
                title,
                url,
                snippet,
                n_docs,
            },
            Insertion::Duplicate => AcquireOutcome::AlreadyPresent { title, url },
            Insertion::EmptyText => AcquireOutcome::NotRetrieved { title, url },
        }
    }
}
