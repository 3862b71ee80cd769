mod datamuse;
mod ollama;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::types::normalize;

pub use datamuse::DatamuseProvider;
pub use ollama::OllamaProvider;

/// Result type for clue suggestion lookups
pub type SuggestResult<T> = Result<T, SuggestError>;

/// Errors that can occur while fetching clue suggestions
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request for bot clue candidates
#[derive(Debug, Clone)]
pub struct SuggestRequest {
    /// The secret word, possibly several tokens
    pub word: String,
    /// Upper bound on returned candidates
    pub max_results: usize,
    pub timeout: Duration,
}

/// Source of ordered, single-token clue candidates for a secret word
#[async_trait]
pub trait ClueSuggestionProvider: Send + Sync {
    /// Candidates, best first
    async fn suggest(&self, request: SuggestRequest) -> SuggestResult<Vec<String>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Keep lower-cased single-token candidates, in order, without repeats
pub(crate) fn single_tokens<I, S>(candidates: I, max_results: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        let word = normalize(candidate.as_ref());
        if word.is_empty() || word.contains(char::is_whitespace) || out.contains(&word) {
            continue;
        }
        out.push(word);
        if out.len() >= max_results {
            break;
        }
    }
    out
}

/// Fixed suggestion table keyed by normalized word
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestions {
    table: HashMap<String, Vec<String>>,
}

impl StaticSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, word: &str, candidates: &[&str]) -> Self {
        self.table.insert(
            normalize(word),
            candidates.iter().map(|c| c.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl ClueSuggestionProvider for StaticSuggestions {
    async fn suggest(&self, request: SuggestRequest) -> SuggestResult<Vec<String>> {
        let candidates = self
            .table
            .get(&normalize(&request.word))
            .cloned()
            .unwrap_or_default();
        Ok(single_tokens(candidates, request.max_results))
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Which suggestion backend to use
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestBackend {
    Datamuse,
    Ollama,
    Disabled,
}

/// Configuration for the clue suggestion provider
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub backend: SuggestBackend,
    pub datamuse_base_url: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub timeout: Duration,
    pub max_results: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            backend: SuggestBackend::Datamuse,
            datamuse_base_url: "https://api.datamuse.com".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            timeout: Duration::from_secs(5),
            max_results: 20,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl SuggestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backend = match env_string("CLUE_PROVIDER").map(|s| s.to_lowercase()).as_deref() {
            Some("ollama") => SuggestBackend::Ollama,
            Some("none") | Some("off") => SuggestBackend::Disabled,
            Some("datamuse") | None => SuggestBackend::Datamuse,
            Some(other) => {
                tracing::warn!("Unknown CLUE_PROVIDER '{}', using datamuse", other);
                SuggestBackend::Datamuse
            }
        };

        Self {
            backend,
            datamuse_base_url: env_string("DATAMUSE_BASE_URL")
                .unwrap_or(defaults.datamuse_base_url),
            ollama_base_url: env_string("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            ollama_model: env_string("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            timeout: env_string("SUGGEST_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_results: env_string("SUGGEST_MAX_RESULTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_results),
        }
    }

    pub fn request(&self, word: &str) -> SuggestRequest {
        SuggestRequest {
            word: word.to_string(),
            max_results: self.max_results,
            timeout: self.timeout,
        }
    }

    /// Build the configured provider
    pub fn build_provider(&self) -> SuggestResult<Arc<dyn ClueSuggestionProvider>> {
        match self.backend {
            SuggestBackend::Datamuse => Ok(Arc::new(DatamuseProvider::new(
                self.datamuse_base_url.clone(),
            )?)),
            SuggestBackend::Ollama => Ok(Arc::new(OllamaProvider::new(
                self.ollama_base_url.clone(),
                self.ollama_model.clone(),
            )?)),
            SuggestBackend::Disabled => Err(SuggestError::ConfigError(
                "Clue suggestions disabled (CLUE_PROVIDER=none)".to_string(),
            )),
        }
    }
}
