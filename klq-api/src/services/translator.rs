//! Translation batcher
//!
//! Source lines go to the translation API in fixed-size batches to bound
//! request size. Each line is cached under its exact source text, so a line
//! repeated across songs is translated at most once per process lifetime
//! (until TTL/eviction). A batch call carries only the lines the cache
//! doesn't know; on any remote failure the whole batch falls back to source
//! text, unretried. The caller always gets back exactly one line per input
//! line, in input order.

use klq_common::{Cache, Error, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "klq/0.1.0 (+https://github.com/klq/klq)";

/// Lines per remote call
const BATCH_SIZE: usize = 40;

const SOURCE_LANG: &str = "KO";
const TARGET_LANG: &str = "JA";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

/// Client for the batched translation endpoint (DeepL-style form POST)
pub struct TranslateClient {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
}

impl TranslateClient {
    pub fn new(url: String, api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            api_key,
        })
    }

    /// Translate a batch of texts, returning one translation per input in
    /// input order
    pub async fn translate(&self, texts: &[&str]) -> Result<Vec<String>> {
        let mut params: Vec<(&str, &str)> = vec![
            ("source_lang", SOURCE_LANG),
            ("target_lang", TARGET_LANG),
        ];
        for text in texts {
            params.push(("text", text));
        }

        debug!(batch = texts.len(), "Calling translation API");

        let response = self
            .http_client
            .post(&self.url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "translation API returned {}",
                status
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("unreadable translation response: {}", e)))?;

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }
}

/// Batched, cached line translation with pass-through fallback
pub struct Translator {
    client: Option<TranslateClient>,
    cache: Arc<Cache>,
}

impl Translator {
    /// `client: None` means no backend is configured; lines pass through
    /// unchanged
    pub fn new(client: Option<TranslateClient>, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    /// Translate a sequence of lines. Output has the same length and order
    /// as the input; empty input yields empty output.
    pub async fn translate_lines(&self, lines: &[String]) -> Vec<String> {
        let Some(client) = &self.client else {
            return lines.to_vec();
        };

        let mut out = Vec::with_capacity(lines.len());
        for batch in lines.chunks(BATCH_SIZE) {
            out.extend(self.translate_batch(client, batch).await);
        }
        out
    }

    /// One batch: split into cached and needed, make at most one remote
    /// call, merge preserving input order
    async fn translate_batch(&self, client: &TranslateClient, batch: &[String]) -> Vec<String> {
        let mut resolved: Vec<Option<String>> = Vec::with_capacity(batch.len());
        let mut needed: Vec<usize> = Vec::new();

        for (i, line) in batch.iter().enumerate() {
            match self.cache.get_as::<String>(&cache_key(line)).await {
                Some(cached) => resolved.push(Some(cached)),
                None => {
                    resolved.push(None);
                    needed.push(i);
                }
            }
        }

        if !needed.is_empty() {
            let texts: Vec<&str> = needed.iter().map(|&i| batch[i].as_str()).collect();
            match client.translate(&texts).await {
                Ok(translations) if translations.len() == texts.len() => {
                    for (&i, translation) in needed.iter().zip(translations) {
                        self.cache
                            .set_as(&cache_key(&batch[i]), &translation)
                            .await;
                        resolved[i] = Some(translation);
                    }
                }
                Ok(translations) => {
                    // Positional distribution is impossible; echo source text
                    warn!(
                        requested = texts.len(),
                        returned = translations.len(),
                        "Translation count mismatch, falling back to source text"
                    );
                }
                Err(e) => {
                    warn!(
                        batch = texts.len(),
                        error = %e,
                        "Translation call failed, falling back to source text"
                    );
                }
            }
        }

        resolved
            .into_iter()
            .enumerate()
            .map(|(i, line)| line.unwrap_or_else(|| batch[i].clone()))
            .collect()
    }
}

fn cache_key(line: &str) -> String {
    format!("translate:{}", line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use klq_common::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};

    fn pass_through_translator() -> Translator {
        let cache = Arc::new(Cache::new(DEFAULT_CAPACITY, DEFAULT_TTL));
        Translator::new(None, cache)
    }

    #[tokio::test]
    async fn pass_through_without_backend() {
        let translator = pass_through_translator();
        let lines = vec!["사랑해".to_string(), "안녕".to_string()];
        assert_eq!(translator.translate_lines(&lines).await, lines);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let translator = pass_through_translator();
        assert!(translator.translate_lines(&[]).await.is_empty());
    }
}
