//! System prompts for the LLM-backed research steps.

use crate::types::Doc;
use crate::utils::config::ReportConfig;
use chrono::Local;

pub const SUMMARIZER_SYSTEM: &str = "You are tasked with summarizing long documents into one or two pages.\n\
The first chunk of the document is retained as-is; you do not need to summarize it.\n\
When summarizing everything after the first chunk, be as extractive as possible: include exact \
content and key excerpts, balancing coverage of the whole text against its most important parts.\n\
Your one-to-two page extractive summary will be used to draft a research report, so exactitude \
and faithful excerpts matter.";

pub const WRITER_SYSTEM: &str = "## INSTRUCTIONS:\n\
You are a technical writer. You will receive a collection of documents and must synthesize their \
content into a concise research report. Do not invent information or bring in outside knowledge; \
use only the provided documents. The report should be well-structured and objective, and give a \
comprehensive overview of the topic. Cite the source of each piece of information with numbered \
footnotes such as [1] in the body, listed in `footnotes`.\n\n\
## OUTPUT FORMAT\n\
Reply with a single JSON object and nothing else:\n\
{\"title\": string, \"body\": string, \"footnotes\": [{\"id\": number, \"description\": string, \"url\": string}]}";

pub const INTENT_SYSTEM: &str = "## BACKGROUND\n\
You are a research assistant helping a user articulate their research goals. Downstream \
researchers will search the web on the user's behalf based on your description of the intent.\n\n\
## USER INPUT\n\
The user asks for research on a topic or entity, e.g. 'Make a marketing report about Twilio', \
'Who are the competitors of Shopify?', or just a name like 'Philip Morris'. Refine such casual \
requests into a precise research intent.\n\n\
## IF THE INTENT IS CLEAR\n\
If the topic is unambiguous and every entity is uniquely identified, restate the request precisely \
and finish.\n\n\
## IF THE INTENT IS AMBIGUOUS\n\
If an entity's identity, the scope of the task or the expected output is unclear, ask the user \
clarifying questions instead. For instance: resolve which company a name refers to, narrow the \
scope of a 'financial report', or ask which output format they want.\n\n\
You will not perform the research yourself.\n\n\
## OUTPUT FORMAT\n\
Reply with a single JSON object and nothing else, in one of two shapes:\n\
{\"kind\": \"clarifying_question\", \"questions\": string}\n\
{\"kind\": \"search_intent\", \"user_intent_short\": string, \"user_intent_long\": string, \
\"recommended_queries\": [string]}\n\
`user_intent_short` is a one-sentence summary, `user_intent_long` a detailed paragraph covering \
scope, desired outputs and entities, and `recommended_queries` a few web-search queries to start \
the research.";

/// System prompt for the agent loop driving the assistant tool registry.
pub fn researcher_system(config: &ReportConfig, max_hits: usize) -> String {
    format!(
        "You are a research assistant. You can search the web, fetch online documents into your \
         knowledge base and finally synthesize them into a brief {min_p}-to-{max_p} paragraph report.\n\
         ## TOOLS\n\
         - `clarify_intent`: resolve an ambiguous goal or entity name. Returns either a clarifying \
         question for the user or a precise `user_intent_long` with recommended queries. Use it first.\n\
         - `web_search`: search DuckDuckGo; returns up to {max_hits} results.\n\
         - `fetch_online_doc`: download a document by URL (or search result) into the knowledge base.\n\
         - `n_docs_downloaded`: count the downloaded documents; aim for {min_d}-to-{max_d}.\n\
         - `write_report`: once enough documents are downloaded, draft the final report from them.",
        min_p = config.min_paragraphs,
        max_p = config.max_paragraphs,
        min_d = config.min_docs,
        max_d = config.max_docs,
        max_hits = max_hits,
    )
}

/// Append today's date so the model can reason about recency.
pub fn with_current_date(system: &str) -> String {
    format!(
        "{}\n\nToday's date is {}.",
        system,
        Local::now().format("%A, %B %-d, %Y")
    )
}

pub fn summary_prompt(title: &str, head: &str, tail: &str) -> String {
    format!(
        "## Title: {}\n\
         ## First Chunk (not required in summary, for use as context):\n{}\n\n\
         ## BEGIN SUMMARIZATION\n\
         Please do a one-to-two page extractive summary of the remainder of the document:\n{}",
        title, head, tail
    )
}

/// Render documents in the XML-like block the writer expects.
pub fn documents_block(docs: &[Doc]) -> String {
    let mut out = String::from(
        "## DOCUMENTS:\nPlease base your report on the following documents:\n<documents>\n",
    );
    for doc in docs {
        out.push_str("    <document>\n");
        out.push_str(&format!("        <h1>{}</h1>\n", doc.title));
        out.push_str(&format!("        <url>{}</url>\n", doc.url));
        out.push_str(&format!("        <body>{}</body>\n", doc.text));
        out.push_str("    </document>\n");
    }
    out.push_str("</documents>\nDo not make up or invent any facts outside of the contents of these documents.");
    out
}

pub fn report_request(intent: &str, config: &ReportConfig) -> String {
    format!(
        "Here is what the report should be about: '{}' \n\
         Please write a report approximately {} to {} paragraphs long, citing the documents \
         with footnotes.",
        intent, config.min_paragraphs, config.max_paragraphs
    )
}
