//! Mock collaborators shared by the integration tests.
//!
//! Each mock records how it was called so tests can assert on call counts,
//! inputs and timing without touching the network.

#![allow(dead_code)]

use async_trait::async_trait;
use dossier::knowledge::{Summarizer, SummaryRequest};
use dossier::types::{AppError, Result};
use dossier::web::{PageFetcher, ProviderError, RawHit, SearchProvider};
use dossier::LLMClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// LLM client returning a fixed reply and recording every prompt.
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// (system, prompt) pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Fetcher serving canned text per URL; unknown URLs yield "".
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

/// Summarizer recording each request and answering with a fixed summary.
pub struct RecordingSummarizer {
    summary: String,
    requests: Mutex<Vec<SummaryRequest>>,
}

impl RecordingSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SummaryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.summary.clone())
    }
}

/// What a scripted provider does on each call.
#[derive(Clone)]
pub enum Script {
    Hits(Vec<RawHit>),
    RateLimited,
    Fail(String),
}

/// Search provider replaying a script; the last entry repeats forever.
pub struct ScriptedSearchProvider {
    script: Vec<Script>,
    calls: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedSearchProvider {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(step: Script) -> Self {
        Self::new(vec![step])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instants at which each call was made.
    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearchProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> std::result::Result<Vec<RawHit>, ProviderError> {
        let step = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(tokio::time::Instant::now());
            let index = (calls.len() - 1).min(self.script.len() - 1);
            self.script[index].clone()
        };

        match step {
            Script::Hits(hits) => Ok(hits.into_iter().take(max_results).collect()),
            Script::RateLimited => Err(ProviderError::classify("202 Ratelimit")),
            Script::Fail(message) => Err(ProviderError::classify(message)),
        }
    }
}

pub fn hit(n: usize) -> RawHit {
    RawHit::new(
        &format!("Result {n}"),
        &format!("https://example.com/{n}"),
        &format!("Excerpt {n}"),
    )
}
