use crate::types::{char_prefix, AppError, Doc, Result};
use crate::utils::config::SummarizeConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Input handed to the summarizer for one oversized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub title: String,
    /// Retained verbatim; context only, not to be summarized.
    pub head: String,
    /// Already capped to the configured maximum.
    pub tail: String,
}

/// Extractive summarization service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;
}

/// Decides whether a document is stored as fetched or as head + summary.
pub struct SummarizationGate {
    summarizer: Arc<dyn Summarizer>,
    threshold_chars: usize,
    max_tail_chars: usize,
    separator: String,
}

impl SummarizationGate {
    pub fn new(summarizer: Arc<dyn Summarizer>, config: &SummarizeConfig) -> Self {
        Self {
            summarizer,
            threshold_chars: config.threshold_chars(),
            max_tail_chars: config.max_tail_chars(),
            separator: config.separator.clone(),
        }
    }

    pub fn threshold_chars(&self) -> usize {
        self.threshold_chars
    }

    pub fn max_tail_chars(&self) -> usize {
        self.max_tail_chars
    }

    pub fn needs_summary(&self, doc: &Doc) -> bool {
        doc.text.chars().nth(self.threshold_chars).is_some()
    }

    /// Split `text` into the verbatim head and the capped tail.
    ///
    /// Tail characters past `max_tail_chars` are dropped.
    pub fn split_head_tail<'a>(&self, text: &'a str) -> (&'a str, &'a str) {
        let head = char_prefix(text, self.threshold_chars);
        let rest = &text[head.len()..];
        (head, char_prefix(rest, self.max_tail_chars))
    }

    /// Pass `doc` through unchanged, or replace its text with head + summary.
    ///
    /// The summarizer is called at most once.
    pub async fn admit(&self, mut doc: Doc) -> Result<Doc> {
        if !self.needs_summary(&doc) {
            return Ok(doc);
        }

        let (head, tail) = self.split_head_tail(&doc.text);
        let original_chars = doc.char_len();
        let request = SummaryRequest {
            title: doc.title.clone(),
            head: head.to_string(),
            tail: tail.to_string(),
        };
        let tail_chars = request.tail.chars().count();
        let dropped_chars = original_chars - self.threshold_chars - tail_chars;
        if dropped_chars > 0 {
            warn!(
                title = %doc.title,
                dropped_chars,
                "Document exceeds the summarization cap; discarding the overflow"
            );
        }

        info!(title = %doc.title, original_chars, tail_chars, "Summarizing document tail");
        let summary = self
            .summarizer
            .summarize(&request)
            .await
            .map_err(|e| AppError::Summarization {
                title: doc.title.clone(),
                reason: e.to_string(),
            })?;

        let SummaryRequest { mut head, .. } = request;
        head.push_str(&self.separator);
        head.push_str(&summary);
        doc.text = head;
        Ok(doc)
    }
}
