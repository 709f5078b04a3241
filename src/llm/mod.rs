//! LLM Provider Clients and Abstractions
//!
//! The language model is a black box to the research pipeline: given a prompt
//! and optional system context, return text. This module hides the provider
//! behind [`LLMClient`] so the summarizer, intent clarifier and report writer
//! work with any of them.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use dossier::llm::Provider;
//!
//! let provider = Provider::from_config(&config.llm)?;
//! let client = provider.create_client().await?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
