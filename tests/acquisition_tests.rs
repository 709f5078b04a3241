//! Acquisition orchestrator and knowledge base behavior end to end,
//! with mocked fetcher, summarizer and LLM.

mod common;

use common::mocks::{MockLLMClient, RecordingSummarizer, Script, ScriptedSearchProvider, StaticFetcher};
use dossier::knowledge::{KnowledgeBase, Readiness, SummarizationGate};
use dossier::research::{AcquireOutcome, Candidate, DocumentAcquirer, ReportOutcome};
use dossier::utils::config::{ResearchConfig, SummarizeConfig};
use dossier::{ResearchSession, SearchResult};
use rstest::rstest;
use std::sync::Arc;
use tokio::sync::Mutex;

fn session_with(fetcher: StaticFetcher, config: ResearchConfig) -> (ResearchSession, Arc<RecordingSummarizer>) {
    let summarizer = Arc::new(RecordingSummarizer::new("SUMMARY"));
    let session = ResearchSession::with_summarizer(
        config,
        Arc::new(MockLLMClient::new("{}")),
        Arc::new(ScriptedSearchProvider::always(Script::Hits(vec![]))),
        Arc::new(fetcher),
        summarizer.clone(),
    );
    (session, summarizer)
}

fn one_page_trigger() -> ResearchConfig {
    let mut config = ResearchConfig::default();
    config.summarize = SummarizeConfig {
        trigger_pages: 1,
        ..Default::default()
    };
    config
}

#[tokio::test]
async fn test_acquiring_twice_is_idempotent() {
    let fetcher = StaticFetcher::new().with_page("https://a.example", "Alpha text");
    let (session, _) = session_with(fetcher, ResearchConfig::default());

    let first = session.fetch_online_doc("https://a.example").await;
    let second = session.fetch_online_doc("https://a.example").await;

    assert!(first.is_added());
    assert!(matches!(second, AcquireOutcome::AlreadyPresent { .. }));
    assert_eq!(
        second.to_string(),
        "Document https://a.example (https://a.example) is already in Knowledge Base."
    );
    assert_eq!(session.size().await, 1);
}

#[tokio::test]
async fn test_long_document_keeps_head_verbatim() {
    let text: String = ('a'..='z').cycle().take(20_000).collect();
    let fetcher = StaticFetcher::new().with_page("https://long.example", &text);
    let (session, summarizer) = session_with(fetcher, one_page_trigger());

    let outcome = session
        .fetch_online_doc(SearchResult {
            title: "Long read".to_string(),
            url: "https://long.example".to_string(),
            excerpt: "A long article".to_string(),
        })
        .await;
    assert!(outcome.is_added(), "{outcome}");

    let docs = session.documents().await;
    assert_eq!(docs.len(), 1);
    assert!(docs[0].text.starts_with(&text[..3350]));
    assert_eq!(docs[0].text, format!("{}\nSUMMARY", &text[..3350]));

    let requests = summarizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].title, "Long read");
    assert_eq!(requests[0].tail, &text[3350..]);
}

#[tokio::test]
async fn test_summarized_document_is_still_deduplicated() {
    let text = "x".repeat(10_000);
    let fetcher = StaticFetcher::new().with_page("https://long.example", &text);
    let (session, summarizer) = session_with(fetcher, one_page_trigger());

    assert!(session.fetch_online_doc("https://long.example").await.is_added());
    let again = session.fetch_online_doc("https://long.example").await;

    assert!(matches!(again, AcquireOutcome::AlreadyPresent { .. }));
    assert_eq!(summarizer.requests().len(), 1);
    assert_eq!(session.size().await, 1);
}

#[tokio::test]
async fn test_tail_never_exceeds_cap() {
    let text = "y".repeat(40_000);
    let fetcher = Arc::new(StaticFetcher::new().with_page("https://huge.example", &text));
    let summarizer = Arc::new(RecordingSummarizer::new("short"));
    let config = SummarizeConfig {
        trigger_pages: 1,
        max_pages: 2,
        chars_per_page: 3350,
        ..Default::default()
    };
    let acquirer = DocumentAcquirer::new(
        fetcher,
        SummarizationGate::new(summarizer.clone(), &config),
        1340,
    );
    let kb = Mutex::new(KnowledgeBase::new());

    acquirer.acquire(&kb, "https://huge.example").await;

    let requests = summarizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tail.chars().count(), 2 * 3350);
    assert_eq!(kb.lock().await.all()[0].text, format!("{}\nshort", "y".repeat(3350)));
}

#[tokio::test]
async fn test_empty_fetch_is_rejected() {
    let (session, _) = session_with(StaticFetcher::new(), ResearchConfig::default());

    let outcome = session
        .fetch_online_doc(SearchResult {
            title: "Gone".to_string(),
            url: "https://gone.example".to_string(),
            excerpt: "This excerpt must not become the document".to_string(),
        })
        .await;

    assert_eq!(
        outcome.to_string(),
        "Document Gone - https://gone.example couldn't be retrieved, ignoring it."
    );
    assert_eq!(session.size().await, 0);
}

#[rstest]
#[case(Candidate::default())]
#[case(Candidate { url: Some("   ".to_string()), title: Some("Blank".to_string()), excerpt: None })]
#[tokio::test]
async fn test_missing_url_is_reported(#[case] candidate: Candidate) {
    let fetcher = StaticFetcher::new();
    let (session, _) = session_with(fetcher, ResearchConfig::default());

    let outcome = session.fetch_online_doc(candidate).await;

    assert_eq!(outcome, AcquireOutcome::MissingUrl);
    assert!(outcome.to_string().contains("requires a `url`"));
    assert_eq!(session.size().await, 0);
}

#[tokio::test]
async fn test_success_message_has_snippet_and_count() {
    let body = "z".repeat(2000);
    let fetcher = StaticFetcher::new().with_page("https://z.example", &body);
    let (session, _) = session_with(fetcher, ResearchConfig::default());

    let message = session
        .fetch_online_doc(Candidate {
            url: Some("https://z.example".to_string()),
            title: Some("Zed".to_string()),
            excerpt: None,
        })
        .await
        .to_string();

    let expected_snippet = "z".repeat(1340);
    assert_eq!(
        message,
        format!(
            "Downloaded and added Zed (https://z.example). Snippet:'{}...'\nThere are now 1 documents in knowledge base.",
            expected_snippet
        )
    );
}

#[tokio::test]
async fn test_three_documents_are_sufficient() {
    let fetcher = StaticFetcher::new()
        .with_page("https://one.example", "one")
        .with_page("https://two.example", "two")
        .with_page("https://three.example", "three");
    let (session, _) = session_with(fetcher, ResearchConfig::default());

    for url in ["https://one.example", "https://two.example", "https://three.example"] {
        assert!(session.fetch_online_doc(url).await.is_added());
    }

    assert_eq!(session.size().await, 3);
    assert_eq!(
        session.readiness().await,
        Readiness::Sufficient {
            n_docs: 3,
            target_reached: false
        }
    );
    let titles: Vec<_> = session.documents().await.into_iter().map(|d| d.url).collect();
    assert_eq!(
        titles,
        vec!["https://one.example", "https://two.example", "https://three.example"]
    );
}

#[tokio::test]
async fn test_two_documents_produce_warning() {
    let fetcher = StaticFetcher::new()
        .with_page("https://one.example", "one")
        .with_page("https://two.example", "two");
    let llm = Arc::new(MockLLMClient::new("{}"));
    let session = ResearchSession::with_summarizer(
        ResearchConfig::default(),
        llm.clone(),
        Arc::new(ScriptedSearchProvider::always(Script::Hits(vec![]))),
        Arc::new(fetcher),
        Arc::new(RecordingSummarizer::new("unused")),
    );

    session.fetch_online_doc("https://one.example").await;
    session.fetch_online_doc("https://two.example").await;

    let goal = "Competitive landscape of Acme Corp";
    match session.write_report(goal, "").await.unwrap() {
        ReportOutcome::TooFewDocs(warning) => {
            assert_eq!(warning.n_docs, 2);
            assert_eq!(warning.user_intent_long, goal);
            assert!(warning.warning.contains(goal));
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_acquisitions_keep_one_copy() {
    let fetcher = StaticFetcher::new().with_page("https://same.example", "same text");
    let (session, _) = session_with(fetcher, ResearchConfig::default());
    let session = Arc::new(session);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.fetch_online_doc("https://same.example").await })
        })
        .collect();

    let mut added = 0;
    for handle in handles {
        if handle.await.unwrap().is_added() {
            added += 1;
        }
    }

    assert_eq!(added, 1);
    assert_eq!(session.size().await, 1);
}
