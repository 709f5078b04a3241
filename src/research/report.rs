use super::parse_structured_reply;
use super::prompts::{documents_block, report_request, with_current_date, WRITER_SYSTEM};
use crate::knowledge::Readiness;
use crate::llm::LLMClient;
use crate::types::{AppError, Doc, Result};
use crate::utils::config::ReportConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    pub id: u32,
    pub description: String,
    pub url: String,
}

impl fmt::Display for Footnote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {} [link]({})", self.id, self.description, self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub footnotes: Vec<Footnote>,
}

impl ResearchReport {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n{}", self.title, self.body);
        if !self.footnotes.is_empty() {
            out.push_str("\n\nNotes:\n");
            let notes: Vec<String> = self.footnotes.iter().map(ToString::to_string).collect();
            out.push_str(&notes.join("\n"));
        }
        out
    }
}

impl fmt::Display for ResearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markdown())
    }
}

/// Not an error: tells the agent loop to gather more documents first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningTooFewDocs {
    pub user_intent_long: String,
    pub n_docs: usize,
    pub warning: String,
}

impl WarningTooFewDocs {
    pub fn new(user_intent_long: impl Into<String>, n_docs: usize) -> Self {
        let user_intent_long = user_intent_long.into();
        let warning = format!(
            "There are only {} documents downloaded to the knowledge base. Please conduct some \
             more web-searches (via `web_search`) and/or download more relevant documents (via \
             `fetch_online_doc`) so that I have enough documents to write a report about: '{}'.",
            n_docs, user_intent_long
        );
        Self {
            user_intent_long,
            n_docs,
            warning,
        }
    }
}

impl fmt::Display for WarningTooFewDocs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.warning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportOutcome {
    Report(ResearchReport),
    TooFewDocs(WarningTooFewDocs),
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportOutcome::Report(report) => report.fmt(f),
            ReportOutcome::TooFewDocs(warning) => warning.fmt(f),
        }
    }
}

/// Drafts the final report from the knowledge base.
pub struct ReportWriter {
    llm: Arc<dyn LLMClient>,
    config: ReportConfig,
}

impl ReportWriter {
    pub fn new(llm: Arc<dyn LLMClient>, config: ReportConfig) -> Self {
        Self { llm, config }
    }

    /// Pick the long intent, falling back to the short one.
    pub fn research_goal<'a>(intent_long: &'a str, intent_short: &'a str) -> Result<&'a str> {
        [intent_long, intent_short]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::InvalidInput(
                    "write_report needs a description of what the report should be about"
                        .to_string(),
                )
            })
    }

    /// Write a report, or warn when the knowledge base is below the minimum.
    ///
    /// The LLM is never called when there are too few documents.
    pub async fn write(
        &self,
        intent_long: &str,
        intent_short: &str,
        docs: &[Doc],
        readiness: Readiness,
    ) -> Result<ReportOutcome> {
        let goal = Self::research_goal(intent_long, intent_short)?;

        if let Readiness::Insufficient { n_docs, min_docs } = readiness {
            warn!(n_docs, min_docs, "Too few documents to write a report");
            return Ok(ReportOutcome::TooFewDocs(WarningTooFewDocs::new(goal, n_docs)));
        }

        let system = format!("{}\n\n{}", WRITER_SYSTEM, documents_block(docs));
        let reply = self
            .llm
            .generate_with_system(&with_current_date(&system), &report_request(goal, &self.config))
            .await?;
        let report: ResearchReport = parse_structured_reply(&reply)?;

        info!(
            title = %report.title,
            n_docs = docs.len(),
            n_footnotes = report.footnotes.len(),
            "Report written"
        );
        Ok(ReportOutcome::Report(report))
    }
}
