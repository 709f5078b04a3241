//! Session-scoped knowledge base
//!
//! The [`KnowledgeBase`] is the ordered, deduplicated store of documents one
//! research session has acquired. Insertion order is preserved because the
//! report writer numbers its citations by it. There is no removal; the store
//! grows until the session is dropped.
//!
//! Oversized documents pass through the [`gate::SummarizationGate`] before
//! insertion, so a stored document's text can differ from what was fetched.
//! The knowledge base remembers a fingerprint of every pre-summary document
//! so that re-acquiring the same page is still recognised as a duplicate.

/// Head/tail split and summarization of oversized documents.
pub mod gate;
/// Summarizer backed by an LLM client.
pub mod summarizer;

pub use gate::{SummarizationGate, Summarizer, SummaryRequest};
pub use summarizer::LlmSummarizer;

use crate::types::Doc;
use crate::utils::config::ReportConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::{debug, info};

/// Result of offering a document to the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added { n_docs: usize },
    Duplicate,
    EmptyText,
}

/// Whether enough documents exist to write a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Readiness {
    Insufficient { n_docs: usize, min_docs: usize },
    Sufficient { n_docs: usize, target_reached: bool },
}

impl Readiness {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Readiness::Sufficient { .. })
    }

    pub fn n_docs(&self) -> usize {
        match self {
            Readiness::Insufficient { n_docs, .. } | Readiness::Sufficient { n_docs, .. } => {
                *n_docs
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    docs: Vec<Doc>,
    fingerprints: HashSet<String>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// True if `doc` is stored, or was stored in summarized form.
    pub fn contains(&self, doc: &Doc) -> bool {
        self.fingerprints.contains(&fingerprint(doc))
    }

    /// Append `doc` unless it is empty or already present.
    pub fn insert(&mut self, doc: Doc) -> Insertion {
        let key = fingerprint(&doc);
        self.insert_keyed(key, doc)
    }

    /// Append `stored`, keyed by the document it was derived from.
    ///
    /// Used after summarization: later acquisitions of `original` are then
    /// detected as duplicates even though the stored text differs.
    pub fn insert_summarized(&mut self, original: &Doc, stored: Doc) -> Insertion {
        let stored_key = fingerprint(&stored);
        if self.fingerprints.contains(&stored_key) {
            return Insertion::Duplicate;
        }
        let outcome = self.insert_keyed(fingerprint(original), stored);
        if let Insertion::Added { .. } = outcome {
            self.fingerprints.insert(stored_key);
        }
        outcome
    }

    fn insert_keyed(&mut self, key: String, doc: Doc) -> Insertion {
        if doc.text.is_empty() {
            debug!(title = %doc.title, url = %doc.url, "Refusing document with empty text");
            return Insertion::EmptyText;
        }
        if self.fingerprints.contains(&key) {
            debug!(title = %doc.title, url = %doc.url, "Document already in knowledge base");
            return Insertion::Duplicate;
        }

        info!(title = %doc.title, url = %doc.url, chars = doc.char_len(), "Adding document");
        self.fingerprints.insert(key);
        self.docs.push(doc);
        Insertion::Added {
            n_docs: self.docs.len(),
        }
    }

    /// Documents in insertion order.
    pub fn all(&self) -> &[Doc] {
        &self.docs
    }

    pub fn snapshot(&self) -> Vec<Doc> {
        self.docs.clone()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.docs.iter().map(|d| d.title.as_str()).collect()
    }

    pub fn readiness(&self, config: &ReportConfig) -> Readiness {
        let n_docs = self.len();
        if n_docs < config.min_docs {
            Readiness::Insufficient {
                n_docs,
                min_docs: config.min_docs,
            }
        } else {
            Readiness::Sufficient {
                n_docs,
                target_reached: n_docs >= config.max_docs,
            }
        }
    }

    /// Human-readable count of the downloaded documents, for the agent loop.
    pub fn status_message(&self) -> String {
        let titles = format!("{:?}", self.titles());
        match self.len() {
            0 => "No documents downloaded. Please do some web-searches and fetch some online \
                  documents/webpages as preparation for writing the report."
                .to_string(),
            1 => format!(
                "There is only 1 document downloaded. Its title is {}. Please download some \
                 more online documents/webpages to support the research request.",
                titles
            ),
            n => format!(
                "There have been {} documents/webpages downloaded and whose text has been \
                 extracted. Their titles are {}",
                n, titles
            ),
        }
    }
}

/// Digest of (title, url, text); each field is length-prefixed so distinct
/// documents never share an encoding.
fn fingerprint(doc: &Doc) -> String {
    let mut hasher = Sha256::new();
    for field in [&doc.title, &doc.url, &doc.text] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}
