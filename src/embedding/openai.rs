//! HTTP adapter for the OpenAI embeddings API.

use crate::config::Config;
use crate::embedding::{EmbeddingClient, EmbeddingClientError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Inputs longer than this many bytes are truncated before the provider call.
/// Embeddings are approximate by nature, so truncation beats rejecting the
/// chunk outright. Roughly six thousand tokens at four bytes per token.
const MAX_INPUT_BYTES: usize = 24_000;

/// Whole-batch retry budget for transient provider failures.
const MAX_ATTEMPTS: usize = 3;

/// Base delay for exponential backoff between attempts.
const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Per-request timeout applied to every embeddings call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbeddingClient {
    pub(crate) client: Client,
    pub(crate) api_base: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) dimension: usize,
}

impl OpenAiEmbeddingClient {
    /// Construct a new client from the supplied configuration.
    pub fn new(config: &Config) -> Result<Self, EmbeddingClientError> {
        let client = Client::builder()
            .user_agent("loreforge/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_base: config.openai_api_base.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
        })
    }

    async fn request_embeddings(
        &self,
        inputs: &[&str],
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_retryable(status) {
                return Err(EmbeddingClientError::RetriesExhausted {
                    attempts: 1,
                    pending: inputs.len(),
                    last_error: format!("{status}: {body}"),
                });
            }
            return Err(EmbeddingClientError::Rejected { status, body });
        }

        let payload: EmbeddingsResponse = response.json().await?;
        let mut data = payload.data;
        if data.len() != inputs.len() {
            return Err(EmbeddingClientError::MalformedResponse(format!(
                "expected {} vectors, got {}",
                inputs.len(),
                data.len()
            )));
        }
        // Order by the response's index field, not by arrival order.
        data.sort_by_key(|entry| entry.index);

        let mut vectors = Vec::with_capacity(data.len());
        for entry in data {
            if entry.embedding.len() != self.dimension {
                return Err(EmbeddingClientError::DimensionMismatch {
                    expected: self.dimension,
                    actual: entry.embedding.len(),
                });
            }
            vectors.push(entry.embedding);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::EmptyInput);
        }

        let inputs: Vec<&str> = texts
            .iter()
            .map(|text| truncate_to_byte_budget(text, MAX_INPUT_BYTES))
            .collect();

        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            match self.request_embeddings(&inputs).await {
                Ok(vectors) => return Ok(vectors),
                Err(EmbeddingClientError::RetriesExhausted { last_error: err, .. }) => {
                    last_error = err;
                }
                Err(EmbeddingClientError::Http(err)) if err.is_timeout() || err.is_connect() => {
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }

            if attempt < MAX_ATTEMPTS {
                let delay = BACKOFF_BASE * 2_u32.pow(attempt as u32 - 1);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Embedding batch failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(EmbeddingClientError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            pending: texts.len(),
            last_error,
        })
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Truncate to at most `budget` bytes, never splitting a UTF-8 character.
fn truncate_to_byte_budget(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer, dimension: usize) -> OpenAiEmbeddingClient {
        let mut config = test_config();
        config.openai_api_base = server.base_url();
        config.embedding_dimension = dimension;
        OpenAiEmbeddingClient::new(&config).expect("client")
    }

    #[tokio::test]
    async fn embed_batch_returns_vectors_in_input_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(serde_json::json!({
                    "object": "list",
                    "model": "text-embedding-3-small",
                    "data": [
                        { "index": 1, "embedding": [0.5, 0.6] },
                        { "index": 0, "embedding": [0.1, 0.2] }
                    ]
                }));
            })
            .await;

        let client = client_for(&server, 2);
        let vectors = client
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .expect("embeddings");

        mock.assert();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.5, 0.6]]);
    }

    #[tokio::test]
    async fn embed_batch_rejects_empty_input() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, 2);
        let error = client.embed_batch(&[]).await.unwrap_err();
        assert!(matches!(error, EmbeddingClientError::EmptyInput));
    }

    #[tokio::test]
    async fn embed_batch_surfaces_dimension_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(serde_json::json!({
                    "data": [{ "index": 0, "embedding": [0.1, 0.2, 0.3] }]
                }));
            })
            .await;

        let client = client_for(&server, 2);
        let error = client
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            EmbeddingClientError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn embed_batch_fails_fast_on_permanent_rejection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(401).body("invalid api key");
            })
            .await;

        let client = client_for(&server, 2);
        let error = client
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();
        // A 401 must not be retried.
        mock.assert_hits(1);
        assert!(matches!(error, EmbeddingClientError::Rejected { .. }));
    }

    #[tokio::test]
    async fn embed_batch_exhausts_retries_on_persistent_server_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(500).body("upstream down");
            })
            .await;

        let client = client_for(&server, 2);
        let error = client
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(
            error,
            EmbeddingClientError::RetriesExhausted {
                attempts: 3,
                pending: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn embed_batch_recovers_after_transient_server_error() {
        let server = MockServer::start_async().await;
        let mut failing = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(503).body("temporarily unavailable");
            })
            .await;

        let client = client_for(&server, 2);
        let task = tokio::spawn(async move { client.embed_batch(&["text".to_string()]).await });

        // Let the first attempt fail, then bring the provider back before
        // the backoff elapses.
        tokio::time::sleep(Duration::from_millis(300)).await;
        failing.delete_async().await;
        let recovered = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(serde_json::json!({
                    "data": [{ "index": 0, "embedding": [0.1, 0.2] }]
                }));
            })
            .await;

        let vectors = task.await.expect("join").expect("embeddings");
        recovered.assert_async().await;
        assert_eq!(vectors, vec![vec![0.1, 0.2]]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo";
        let truncated = truncate_to_byte_budget(text, 2);
        assert_eq!(truncated, "h");
        assert_eq!(truncate_to_byte_budget("short", 100), "short");
    }
}
