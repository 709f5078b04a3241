//! Research workflow
//!
//! A [`ResearchSession`](session::ResearchSession) owns one knowledge base and
//! everything needed to fill it and report on it:
//!
//! 1. **Clarify** - [`intent::IntentClarifier`] turns a casual request into a
//!    precise research intent, or asks the user a question
//! 2. **Search** - the web search client returns candidates
//! 3. **Acquire** - [`acquire::DocumentAcquirer`] fetches, summarizes and
//!    stores a candidate, answering with a status message
//! 4. **Report** - [`report::ReportWriter`] drafts a cited report once enough
//!    documents are stored, otherwise returns a warning
//!
//! # Usage
//!
//! ```ignore
//! use dossier::research::ResearchSession;
//!
//! let session = ResearchSession::connect(config).await?;
//! for hit in session.web_search("Twilio competitors").await?.into_iter().take(3) {
//!     println!("{}", session.fetch_online_doc(hit).await);
//! }
//! println!("{}", session.write_report("Twilio's main competitors", "").await?);
//! ```

/// Candidate acquisition into the knowledge base.
pub mod acquire;
/// Research-intent clarification.
pub mod intent;
/// Prompt templates.
pub mod prompts;
/// Report types and the report writer.
pub mod report;
/// Session state and operations.
pub mod session;

pub use acquire::{AcquireOutcome, Candidate, DocumentAcquirer};
pub use intent::{IntentClarifier, IntentOutcome};
pub use report::{Footnote, ReportOutcome, ReportWriter, ResearchReport, WarningTooFewDocs};
pub use session::ResearchSession;

use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;

/// Parse a JSON object out of an LLM reply.
///
/// Tolerates a surrounding ```json fence or prose around the object.
pub fn parse_structured_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    let object = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    };
    serde_json::from_str(object)
        .map_err(|e| AppError::LLM(format!("Could not parse structured reply: {}", e)))
}
