//! # dossier - research document acquisition
//!
//! The document-acquisition half of an LLM research assistant: search the web,
//! fetch HTML and PDF documents under unreliable network conditions, normalize
//! them to plain text, summarize oversized ones, and keep them in a
//! deduplicated per-session knowledge base that a report writer cites from.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dossier::{ResearchConfig, ResearchSession};
//!
//! #[tokio::main]
//! async fn main() -> dossier::Result<()> {
//!     let session = ResearchSession::connect(ResearchConfig::from_env()?).await?;
//!
//!     let hits = session.web_search("Twilio competitors").await?;
//!     for hit in hits.into_iter().take(3) {
//!         println!("{}", session.fetch_online_doc(hit).await);
//!     }
//!
//!     println!("{}", session.n_docs_downloaded().await);
//!     println!("{}", session.write_report("Twilio's main competitors", "").await?);
//!     Ok(())
//! }
//! ```
//!
//! ### Driving it from an agent loop
//!
//! ```rust,ignore
//! use dossier::tools::assistant_registry;
//! use std::sync::Arc;
//!
//! let session = Arc::new(ResearchSession::connect(config).await?);
//! let registry = assistant_registry(&session);
//! let definitions = registry.get_tool_definitions();
//! let status = registry.execute("n_docs_downloaded", serde_json::json!({})).await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API support |
//!
//! ## Modules
//!
//! - [`web`] - search client, fetcher and content extraction
//! - [`knowledge`] - knowledge base and summarization gate
//! - [`research`] - acquisition orchestrator, intent clarification, reports
//! - [`llm`] - LLM client implementations
//! - [`tools`] - session capabilities as agent tools
//! - [`types`] - common types and error handling
//! - [`utils`] - configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface.
pub mod cli;
/// Knowledge base and summarization gate.
pub mod knowledge;
/// LLM provider clients and abstractions.
pub mod llm;
/// Research session, acquisition and reporting.
pub mod research;
/// Session-backed agent tools.
pub mod tools;
/// Core types and errors.
pub mod types;
/// Configuration.
pub mod utils;
/// Search, fetch and extraction.
pub mod web;

// Re-export commonly used types
pub use knowledge::{KnowledgeBase, Readiness, SummarizationGate, Summarizer};
pub use llm::{LLMClient, Provider};
pub use research::{AcquireOutcome, Candidate, ReportOutcome, ResearchSession};
pub use tools::ToolRegistry;
pub use types::{AppError, Doc, Query, Result, SearchResult};
pub use utils::{ConfigError, ResearchConfig};
pub use web::{Fetcher, PageFetcher, SearchClient, SearchProvider};
