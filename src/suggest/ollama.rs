use super::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Clue candidates from a local Ollama model
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given base URL and model
    pub fn new(base_url: String, model: String) -> SuggestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SuggestError::ConfigError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }

    fn prompt(word: &str, max_results: usize) -> String {
        format!(
            "We are playing a party game where players give one-word clues so a teammate \
            can guess a secret term. The secret term is: \"{}\". \
            List {} different single-word clues, best first, separated by commas. \
            Never use the secret term or any part of it. \
            Answer with the comma-separated list only.",
            word, max_results
        )
    }

    /// Split a free-form model answer into candidate words
    fn parse_answer(answer: &str, max_results: usize) -> Vec<String> {
        let pieces = answer
            .split([',', '\n', ';'])
            .map(|piece| {
                piece
                    .trim()
                    .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-')
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_string()
            })
            .collect::<Vec<_>>();
        single_tokens(pieces, max_results)
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)] // Part of Ollama API response format
    done: bool,
}

#[async_trait]
impl ClueSuggestionProvider for OllamaProvider {
    async fn suggest(&self, request: SuggestRequest) -> SuggestResult<Vec<String>> {
        let start = Instant::now();

        let ollama_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: Self::prompt(&request.word, request.max_results),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);

        // Execute with timeout
        let response = tokio::time::timeout(
            request.timeout,
            self.client.post(&url).json(&ollama_request).send(),
        )
        .await
        .map_err(|_| SuggestError::Timeout(request.timeout))?
        .map_err(|e| SuggestError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SuggestError::ApiError(format!(
                "Ollama API returned status: {}",
                response.status()
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| SuggestError::ParseError(e.to_string()))?;

        let candidates = Self::parse_answer(&ollama_response.response, request.max_results);
        if candidates.is_empty() {
            return Err(SuggestError::ParseError(
                "Model answer contained no usable clues".to_string(),
            ));
        }

        tracing::debug!(
            "Ollama ({}) suggested {} clues in {}ms",
            self.model,
            candidates.len(),
            start.elapsed().as_millis()
        );

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
