use super::*;
use serde::Deserialize;
use std::time::Instant;

/// Word association lookups against the Datamuse API
pub struct DatamuseProvider {
    base_url: String,
    client: reqwest::Client,
}

impl DatamuseProvider {
    pub fn new(base_url: String) -> SuggestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SuggestError::ConfigError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Triggers work well for single words, "means like" for phrases
    fn relation(word: &str) -> &'static str {
        if word.trim().contains(char::is_whitespace) {
            "ml"
        } else {
            "rel_trg"
        }
    }
}

#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
    #[serde(default)]
    #[allow(dead_code)] // Part of Datamuse response format, results arrive sorted
    score: Option<u64>,
}

#[async_trait]
impl ClueSuggestionProvider for DatamuseProvider {
    async fn suggest(&self, request: SuggestRequest) -> SuggestResult<Vec<String>> {
        let start = Instant::now();
        let word = normalize(&request.word);
        let url = format!("{}/words", self.base_url);
        // Ask for extra results since phrases get filtered out afterwards
        let max = (request.max_results * 2).to_string();

        let response = tokio::time::timeout(
            request.timeout,
            self.client
                .get(&url)
                .query(&[(Self::relation(&word), word.as_str()), ("max", max.as_str())])
                .send(),
        )
        .await
        .map_err(|_| SuggestError::Timeout(request.timeout))?
        .map_err(|e| SuggestError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SuggestError::ApiError(format!(
                "Datamuse API returned status: {}",
                response.status()
            )));
        }

        let words: Vec<DatamuseWord> = response
            .json()
            .await
            .map_err(|e| SuggestError::ParseError(e.to_string()))?;

        let candidates = single_tokens(words.into_iter().map(|w| w.word), request.max_results);

        tracing::debug!(
            "Datamuse returned {} candidates for '{}' in {}ms",
            candidates.len(),
            word,
            start.elapsed().as_millis()
        );

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "datamuse"
    }
}
