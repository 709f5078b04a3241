use super::parse_structured_reply;
use super::prompts::{with_current_date, INTENT_SYSTEM};
use crate::llm::LLMClient;
use crate::types::{AppError, Query, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// What the clarifier made of a research request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentOutcome {
    /// The request is ambiguous; ask the user before researching.
    ClarifyingQuestion { questions: String },

    /// The request is clear enough to start searching.
    SearchIntent {
        user_intent_short: String,
        user_intent_long: String,
        #[serde(default, deserialize_with = "deserialize_queries")]
        recommended_queries: Vec<Query>,
    },
}

/// Accept queries as plain strings or as `{"text": ...}` objects.
fn deserialize_queries<'de, D>(deserializer: D) -> std::result::Result<Vec<Query>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum QueryRepr {
        Text(String),
        Object(Query),
    }

    let raw: Option<Vec<QueryRepr>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|q| match q {
            QueryRepr::Text(text) => Query::new(text),
            QueryRepr::Object(query) => query,
        })
        .collect())
}

pub struct IntentClarifier {
    llm: Arc<dyn LLMClient>,
}

impl IntentClarifier {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub async fn clarify(&self, request: &str) -> Result<IntentOutcome> {
        if request.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "research request must not be empty".to_string(),
            ));
        }

        let reply = self
            .llm
            .generate_with_system(&with_current_date(INTENT_SYSTEM), request)
            .await?;
        let outcome: IntentOutcome = parse_structured_reply(&reply)?;

        match &outcome {
            IntentOutcome::ClarifyingQuestion { .. } => {
                info!("Research intent is ambiguous, asking the user")
            }
            IntentOutcome::SearchIntent {
                user_intent_short,
                recommended_queries,
                ..
            } => info!(
                intent = %user_intent_short,
                n_queries = recommended_queries.len(),
                "Research intent resolved"
            ),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clarifying_question() {
        let outcome: IntentOutcome = serde_json::from_str(
            r#"{"kind": "clarifying_question", "questions": "Which Reuters do you mean?"}"#,
        )
        .unwrap();
        assert_eq!(
            outcome,
            IntentOutcome::ClarifyingQuestion {
                questions: "Which Reuters do you mean?".to_string()
            }
        );
    }

    #[test]
    fn test_parse_search_intent_with_mixed_queries() {
        let outcome: IntentOutcome = serde_json::from_str(
            r#"{
                "kind": "search_intent",
                "user_intent_short": "Twilio marketing",
                "user_intent_long": "A marketing report on Twilio Inc.",
                "recommended_queries": ["Twilio products", {"text": "Twilio competitors"}]
            }"#,
        )
        .unwrap();

        match outcome {
            IntentOutcome::SearchIntent {
                recommended_queries,
                ..
            } => assert_eq!(
                recommended_queries,
                vec![Query::new("Twilio products"), Query::new("Twilio competitors")]
            ),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_missing_queries_default_to_empty() {
        let outcome: IntentOutcome = serde_json::from_str(
            r#"{"kind": "search_intent", "user_intent_short": "a", "user_intent_long": "b"}"#,
        )
        .unwrap();
        assert!(matches!(
            outcome,
            IntentOutcome::SearchIntent { recommended_queries, .. } if recommended_queries.is_empty()
        ));
    }
}
