//! Research capabilities exposed as tools
//!
//! Every tool wraps the same [`ResearchSession`]; the two registry builders
//! below decide which capabilities each agent loop gets.

use crate::research::prompts::{researcher_system, with_current_date};
use crate::research::{Candidate, ResearchSession};
use crate::tools::registry::{Tool, ToolRegistry};
use crate::types::{AppError, Query, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tools for the research assistant loop.
pub fn assistant_registry(session: &Arc<ResearchSession>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ClarifyIntentTool::new(Arc::clone(session))));
    registry.register(Arc::new(WebSearchTool::new(Arc::clone(session))));
    registry.register(Arc::new(FetchOnlineDocTool::new(Arc::clone(session))));
    registry.register(Arc::new(NDocsDownloadedTool::new(Arc::clone(session))));
    registry.register(Arc::new(WriteReportTool::new(Arc::clone(session))));
    registry
}

/// System prompt for the agent loop that drives [`assistant_registry`].
pub fn assistant_system_prompt(session: &ResearchSession) -> String {
    let config = session.config();
    with_current_date(&researcher_system(&config.report, config.search.max_hits))
}

/// Tools for the intent clarification loop.
pub fn intent_registry(session: &Arc<ResearchSession>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(Arc::clone(session))));
    registry.register(Arc::new(FetchOnlineDocTool::new(Arc::clone(session))));
    registry
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing '{}' parameter", key)))
}

pub struct ClarifyIntentTool {
    session: Arc<ResearchSession>,
}

impl ClarifyIntentTool {
    pub fn new(session: Arc<ResearchSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ClarifyIntentTool {
    fn name(&self) -> &str {
        "clarify_intent"
    }

    fn description(&self) -> &str {
        "Clarify the user's research intent. Returns either clarifying questions to ask the user \
         or a precise statement of the intent with recommended search queries."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The user's research request, verbatim"
                }
            },
            "required": ["request"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let request = required_str(&args, "request")?;
        let outcome = self.session.clarify_intent(request).await?;
        serde_json::to_value(outcome).map_err(|e| AppError::Internal(e.to_string()))
    }
}

pub struct WebSearchTool {
    session: Arc<ResearchSession>,
}

impl WebSearchTool {
    pub fn new(session: Arc<ResearchSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo and return title, url and excerpt for each hit"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = match args.get("query") {
            Some(Value::Object(obj)) => obj.get("text").and_then(Value::as_str),
            Some(other) => other.as_str(),
            None => None,
        }
        .filter(|q| !q.trim().is_empty())
        .map(Query::from)
        .ok_or_else(|| AppError::InvalidInput("Missing 'query' parameter".to_string()))?;

        let results = self.session.web_search(query.clone()).await?;
        Ok(json!({
            "query": query.text,
            "count": results.len(),
            "results": results,
        }))
    }
}

pub struct FetchOnlineDocTool {
    session: Arc<ResearchSession>,
}

impl FetchOnlineDocTool {
    pub fn new(session: Arc<ResearchSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for FetchOnlineDocTool {
    fn name(&self) -> &str {
        "fetch_online_doc"
    }

    fn description(&self) -> &str {
        "Download an online document (web page or PDF) into the knowledge base, given its url \
         or a search result"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "description": "URL of the document, or a search result object with title, url and excerpt",
                    "oneOf": [
                        {"type": "string"},
                        {
                            "type": "object",
                            "properties": {
                                "title": {"type": "string"},
                                "url": {"type": "string"},
                                "excerpt": {"type": "string"}
                            },
                            "required": ["url"]
                        }
                    ]
                },
                "title": {
                    "type": "string",
                    "description": "Optional title; defaults to the url"
                },
                "excerpt": {
                    "type": "string",
                    "description": "Optional search-result excerpt"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let outcome = self
            .session
            .fetch_online_doc(Candidate::from_tool_args(&args))
            .await;
        Ok(json!({
            "added": outcome.is_added(),
            "message": outcome.to_string(),
        }))
    }
}

pub struct NDocsDownloadedTool {
    session: Arc<ResearchSession>,
}

impl NDocsDownloadedTool {
    pub fn new(session: Arc<ResearchSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for NDocsDownloadedTool {
    fn name(&self) -> &str {
        "n_docs_downloaded"
    }

    fn description(&self) -> &str {
        "Count the documents downloaded to the knowledge base and list their titles"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(json!({
            "n_docs": self.session.size().await,
            "message": self.session.n_docs_downloaded().await,
        }))
    }
}

pub struct WriteReportTool {
    session: Arc<ResearchSession>,
}

impl WriteReportTool {
    pub fn new(session: Arc<ResearchSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for WriteReportTool {
    fn name(&self) -> &str {
        "write_report"
    }

    fn description(&self) -> &str {
        "Write the final research report from the downloaded documents. Returns a warning \
         instead when too few documents have been downloaded."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_intent_long": {
                    "type": "string",
                    "description": "Detailed description of what the report should cover"
                },
                "user_intent_short": {
                    "type": "string",
                    "description": "One-sentence summary, used if the long form is empty"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let text = |key: &str| args.get(key).and_then(Value::as_str).unwrap_or_default();
        let outcome = self
            .session
            .write_report(text("user_intent_long"), text("user_intent_short"))
            .await?;

        let mut value =
            serde_json::to_value(&outcome).map_err(|e| AppError::Internal(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.insert("text".to_string(), Value::String(outcome.to_string()));
        }
        Ok(value)
    }
}
