//! Embedding client abstraction and the OpenAI-backed adapter.

mod openai;

pub use openai::OpenAiEmbeddingClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// No input text was supplied.
    #[error("no texts provided for embedding")]
    EmptyInput,
    /// HTTP layer failed before receiving a response.
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider rejected the request in a way that retrying cannot fix.
    #[error("embedding provider rejected the request ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: reqwest::StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Transient failures persisted past the retry budget.
    #[error("embedding failed after {attempts} attempts; {pending} input(s) were not embedded: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made before giving up.
        attempts: usize,
        /// Count of inputs left without embeddings when the batch was abandoned.
        pending: usize,
        /// Description of the final failure.
        last_error: String,
    },
    /// Provider returned a vector whose width does not match the configured index.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality configured for the index.
        expected: usize,
        /// Dimensionality actually returned by the provider.
        actual: usize,
    },
    /// Provider response was missing vectors or returned them out of shape.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
}

/// Interface implemented by embedding backends.
///
/// Vectors are returned in the same order as the supplied texts. Batches are
/// all-or-nothing: a failed batch produces no vectors for any of its inputs.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Produce an embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingClientError::MalformedResponse("empty batch result".into()))
    }
}
