//! Research session configuration
//!
//! Every tunable of the acquisition pipeline lives in [`ResearchConfig`]: search
//! hit counts and retries, fetch backoff and timeouts, the summarization
//! trigger, and report readiness bounds. The config is loaded from a TOML file
//! and/or the environment and handed to each component's constructor, so no
//! component reads process-wide settings on its own.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Characters in one "page": roughly 500 words at 6.7 characters per word.
pub const CHARS_PER_PAGE: usize = 3350;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "DOSSIER_";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub summarize: SummarizeConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            summarize: SummarizeConfig::default(),
            report: ReportConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

// ============= Search Configuration =============

/// What to do with a provider hit that lacks a title, url or excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedHitPolicy {
    /// Drop the hit, log it and keep the rest of the batch.
    #[default]
    Skip,
    /// Abort the whole search with a provider error.
    FailFast,
}

impl FromStr for MalformedHitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail_fast" | "fail-fast" => Ok(Self::FailFast),
            other => Err(format!("unknown malformed hit policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,

    /// Extra attempts made only when the provider reports a rate limit
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay; attempt `n` waits `base * (1 + n)`
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    #[serde(default)]
    pub malformed_hits: MalformedHitPolicy,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_hits() -> usize {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_rate_limit_backoff_ms() -> u64 {
    4000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_hits: default_max_hits(),
            retries: default_retries(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            malformed_hits: MalformedHitPolicy::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Fetch Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Extra attempts after a retryable network failure
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Attempt `n` waits `unit * 2^n` before the next try
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_accept")]
    pub accept: String,
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff_unit_ms: default_backoff_unit_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            accept: default_accept(),
        }
    }
}

impl FetchConfig {
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Summarization Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// Documents longer than this many pages get their tail summarized
    #[serde(default = "default_trigger_pages")]
    pub trigger_pages: usize,

    /// Tail text beyond this many pages is dropped before summarizing
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_chars_per_page")]
    pub chars_per_page: usize,

    /// Inserted between the retained head and the summary
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_trigger_pages() -> usize {
    6
}

fn default_max_pages() -> usize {
    50
}

fn default_chars_per_page() -> usize {
    CHARS_PER_PAGE
}

fn default_separator() -> String {
    "\n".to_string()
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            trigger_pages: default_trigger_pages(),
            max_pages: default_max_pages(),
            chars_per_page: default_chars_per_page(),
            separator: default_separator(),
        }
    }
}

impl SummarizeConfig {
    /// Head length in characters; also the length above which a doc is summarized.
    pub fn threshold_chars(&self) -> usize {
        self.trigger_pages * self.chars_per_page
    }

    /// Largest tail, in characters, ever handed to the summarizer.
    pub fn max_tail_chars(&self) -> usize {
        self.max_pages * self.chars_per_page
    }
}

// ============= Report Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_min_docs")]
    pub min_docs: usize,

    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    #[serde(default = "default_min_paragraphs")]
    pub min_paragraphs: usize,

    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,

    /// Length of the text preview returned after a successful acquisition
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

fn default_min_docs() -> usize {
    3
}

fn default_max_docs() -> usize {
    5
}

fn default_min_paragraphs() -> usize {
    3
}

fn default_max_paragraphs() -> usize {
    5
}

fn default_snippet_chars() -> usize {
    1340
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_docs: default_min_docs(),
            max_docs: default_max_docs(),
            min_paragraphs: default_min_paragraphs(),
            max_paragraphs: default_max_paragraphs(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::Ollama {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

// ============= Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for environment variable '{name}'")]
    InvalidEnvVar { name: String, value: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Config(err.to_string())
    }
}

impl ResearchConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: ResearchConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Defaults overridden by `DOSSIER_*` environment variables (after reading `.env`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from any key/value source, e.g. the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "LOG_LEVEL", &mut self.log_level)?;
        override_from(&lookup, "SEARCH_MAX_HITS", &mut self.search.max_hits)?;
        override_from(&lookup, "SEARCH_RETRIES", &mut self.search.retries)?;
        override_from(&lookup, "SEARCH_MALFORMED_HITS", &mut self.search.malformed_hits)?;
        override_from(&lookup, "FETCH_RETRIES", &mut self.fetch.retries)?;
        override_from(&lookup, "FETCH_TIMEOUT_SECS", &mut self.fetch.timeout_secs)?;
        override_from(&lookup, "SUMMARIZE_TRIGGER_PAGES", &mut self.summarize.trigger_pages)?;
        override_from(&lookup, "MAX_PAGES_SUMMARIZE", &mut self.summarize.max_pages)?;
        override_from(&lookup, "MIN_DOCS", &mut self.report.min_docs)?;
        override_from(&lookup, "MAX_DOCS", &mut self.report.max_docs)?;
        override_from(&lookup, "MIN_PARAGRAPHS", &mut self.report.min_paragraphs)?;
        override_from(&lookup, "MAX_PARAGRAPHS", &mut self.report.max_paragraphs)?;
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_hits == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_hits must be at least 1".to_string(),
            ));
        }
        if self.summarize.trigger_pages == 0 || self.summarize.chars_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "summarize.trigger_pages and summarize.chars_per_page must be positive".to_string(),
            ));
        }
        if self.summarize.max_pages == 0 {
            return Err(ConfigError::ValidationError(
                "summarize.max_pages must be at least 1".to_string(),
            ));
        }
        if self.report.min_docs > self.report.max_docs {
            return Err(ConfigError::ValidationError(format!(
                "report.min_docs ({}) exceeds report.max_docs ({})",
                self.report.min_docs, self.report.max_docs
            )));
        }
        if self.report.min_paragraphs > self.report.max_paragraphs {
            return Err(ConfigError::ValidationError(format!(
                "report.min_paragraphs ({}) exceeds report.max_paragraphs ({})",
                self.report.min_paragraphs, self.report.max_paragraphs
            )));
        }
        Ok(())
    }
}

fn override_from<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let name = format!("{}{}", ENV_PREFIX, key);
    if let Some(raw) = lookup(&name) {
        *slot = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
            name: name.clone(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ResearchConfig::default();
        assert_eq!(config.search.max_hits, 10);
        assert_eq!(config.search.retries, 2);
        assert_eq!(config.fetch.retries, 2);
        assert_eq!(config.summarize.trigger_pages, 6);
        assert_eq!(config.summarize.max_pages, 50);
        assert_eq!(config.report.min_docs, 3);
        assert_eq!(config.report.max_docs, 5);
        assert_eq!(config.report.snippet_chars, 1340);
        assert_eq!(config.search.malformed_hits, MalformedHitPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_arithmetic() {
        let summarize = SummarizeConfig::default();
        assert_eq!(summarize.threshold_chars(), 6 * 3350);
        assert_eq!(summarize.max_tail_chars(), 167_500);
    }

    #[test]
    fn test_parse_partial_toml() {
        let content = r#"
log_level = "debug"

[search]
max_hits = 5
malformed_hits = "fail_fast"

[summarize]
trigger_pages = 10

[llm]
type = "openai"
api_key_env = "OPENAI_API_KEY"
model = "gpt-4o-mini"
"#;
        let config: ResearchConfig = toml::from_str(content).expect("Failed to parse config");

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.search.max_hits, 5);
        assert_eq!(config.search.retries, 2);
        assert_eq!(config.search.malformed_hits, MalformedHitPolicy::FailFast);
        assert_eq!(config.summarize.trigger_pages, 10);
        assert_eq!(config.report.min_docs, 3);
        match config.llm {
            LlmConfig::OpenAI { api_base, model, .. } => {
                assert_eq!(api_base, "https://api.openai.com/v1");
                assert_eq!(model, "gpt-4o-mini");
            }
            _ => panic!("Expected OpenAI config"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nmin_docs = 2\nmax_docs = 4").unwrap();

        let config = ResearchConfig::load(file.path()).unwrap();
        assert_eq!(config.report.min_docs, 2);
        assert_eq!(config.report.max_docs, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ResearchConfig::load("/definitely/not/here/dossier.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DOSSIER_SEARCH_MAX_HITS", "4"),
            ("DOSSIER_FETCH_RETRIES", "0"),
            ("DOSSIER_SUMMARIZE_TRIGGER_PAGES", "10"),
            ("DOSSIER_SEARCH_MALFORMED_HITS", "fail-fast"),
        ]
        .into_iter()
        .collect();

        let mut config = ResearchConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.search.max_hits, 4);
        assert_eq!(config.fetch.retries, 0);
        assert_eq!(config.summarize.trigger_pages, 10);
        assert_eq!(config.search.malformed_hits, MalformedHitPolicy::FailFast);
        assert_eq!(config.search.retries, 2);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = ResearchConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "DOSSIER_MIN_DOCS").then(|| "three".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_validation_min_exceeds_max() {
        let mut config = ResearchConfig::default();
        config.report.min_docs = 6;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
