use super::acquire::{AcquireOutcome, Candidate, DocumentAcquirer};
use super::intent::{IntentClarifier, IntentOutcome};
use super::report::{ReportOutcome, ReportWriter};
use crate::knowledge::{KnowledgeBase, LlmSummarizer, Readiness, SummarizationGate, Summarizer};
use crate::llm::{LLMClient, Provider};
use crate::types::{Doc, Query, Result, SearchResult};
use crate::utils::config::ResearchConfig;
use crate::web::{DuckDuckGoProvider, Fetcher, PageFetcher, SearchClient, SearchProvider};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// One research session: a knowledge base plus the collaborators that fill it.
///
/// The knowledge base is created empty and dropped with the session.
pub struct ResearchSession {
    id: Uuid,
    config: ResearchConfig,
    knowledge: Mutex<KnowledgeBase>,
    search: SearchClient,
    acquirer: DocumentAcquirer,
    clarifier: IntentClarifier,
    writer: ReportWriter,
}

impl ResearchSession {
    pub fn new(
        config: ResearchConfig,
        llm: Arc<dyn LLMClient>,
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let summarizer = Arc::new(LlmSummarizer::new(Arc::clone(&llm)));
        Self::with_summarizer(config, llm, provider, fetcher, summarizer)
    }

    pub fn with_summarizer(
        config: ResearchConfig,
        llm: Arc<dyn LLMClient>,
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let gate = SummarizationGate::new(summarizer, &config.summarize);
        let id = Uuid::new_v4();
        info!(session = %id, provider = provider.name(), model = llm.model_name(), "Research session started");

        Self {
            id,
            search: SearchClient::new(provider, &config.search),
            acquirer: DocumentAcquirer::new(fetcher, gate, config.report.snippet_chars),
            clarifier: IntentClarifier::new(Arc::clone(&llm)),
            writer: ReportWriter::new(llm, config.report.clone()),
            knowledge: Mutex::new(KnowledgeBase::new()),
            config,
        }
    }

    /// Session wired to the configured LLM, DuckDuckGo and the HTTP fetcher.
    pub async fn connect(config: ResearchConfig) -> Result<Self> {
        let llm: Arc<dyn LLMClient> = Provider::from_config(&config.llm)?
            .create_client()
            .await?
            .into();
        let fetcher = Arc::new(Fetcher::new(&config.fetch)?);
        Ok(Self::new(
            config,
            llm,
            Arc::new(DuckDuckGoProvider::new()),
            fetcher,
        ))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    pub async fn web_search(&self, query: impl Into<Query>) -> Result<Vec<SearchResult>> {
        self.search.search(&query.into()).await
    }

    pub async fn fetch_online_doc(&self, candidate: impl Into<Candidate>) -> AcquireOutcome {
        self.acquirer.acquire(&self.knowledge, candidate).await
    }

    pub async fn n_docs_downloaded(&self) -> String {
        self.knowledge.lock().await.status_message()
    }

    pub async fn size(&self) -> usize {
        self.knowledge.lock().await.len()
    }

    pub async fn readiness(&self) -> Readiness {
        self.knowledge.lock().await.readiness(&self.config.report)
    }

    /// Snapshot of the knowledge base in insertion order.
    pub async fn documents(&self) -> Vec<Doc> {
        self.knowledge.lock().await.snapshot()
    }

    pub async fn clarify_intent(&self, request: &str) -> Result<IntentOutcome> {
        self.clarifier.clarify(request).await
    }

    pub async fn write_report(&self, intent_long: &str, intent_short: &str) -> Result<ReportOutcome> {
        let (docs, readiness) = {
            let kb = self.knowledge.lock().await;
            (kb.snapshot(), kb.readiness(&self.config.report))
        };
        self.writer
            .write(intent_long, intent_short, &docs, readiness)
            .await
    }
}
