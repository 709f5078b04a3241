use super::gate::{Summarizer, SummaryRequest};
use crate::llm::LLMClient;
use crate::research::prompts::{summary_prompt, with_current_date, SUMMARIZER_SYSTEM};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// [`Summarizer`] that asks the configured LLM for an extractive summary.
pub struct LlmSummarizer {
    llm: Arc<dyn LLMClient>,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        debug!(
            title = %request.title,
            model = self.llm.model_name(),
            "Requesting extractive summary"
        );
        let prompt = summary_prompt(&request.title, &request.head, &request.tail);
        let summary = self
            .llm
            .generate_with_system(&with_current_date(SUMMARIZER_SYSTEM), &prompt)
            .await?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(AppError::LLM("summarizer returned no text".to_string()));
        }
        Ok(summary.to_string())
    }
}
