//! Shared types used by the Pinecone client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned while interacting with Pinecone.
#[derive(Debug, Error)]
pub enum PineconeError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Pinecone URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Pinecone responded with an unexpected status code.
    #[error("Unexpected Pinecone response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Pinecone.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// An index with the requested name exists but is incompatible.
    ///
    /// This state is terminal: the caller must delete the index explicitly,
    /// the client never drops or recreates an index on its own.
    #[error(
        "index '{index}' already exists with dimension {actual_dimension}/metric '{actual_metric}', \
         expected dimension {expected_dimension}/metric '{expected_metric}'"
    )]
    Conflict {
        /// Index name that collided.
        index: String,
        /// Dimensionality this deployment is configured for.
        expected_dimension: usize,
        /// Dimensionality found on the existing index.
        actual_dimension: usize,
        /// Similarity metric this deployment is configured for.
        expected_metric: String,
        /// Similarity metric found on the existing index.
        actual_metric: String,
    },
    /// Index never reported ready within the polling budget.
    #[error("index '{index}' not ready after {waited_secs}s")]
    NotReady {
        /// Index that was being polled.
        index: String,
        /// Total seconds spent polling before giving up.
        waited_secs: u64,
    },
    /// The named index does not exist.
    #[error("index '{0}' does not exist")]
    IndexNotFound(String),
}

/// Metadata stored alongside each vector record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Raw chunk text, used verbatim for context assembly.
    pub text: String,
    /// Name of the source document the chunk came from.
    pub source: String,
    /// Position of the chunk within its document (1-based).
    pub chunk_index: usize,
}

/// Vector record ready for upsert into a namespace.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    /// Stable identifier; re-upserting the same id overwrites the record.
    pub id: String,
    /// Embedding values.
    pub values: Vec<f32>,
    /// Chunk metadata carried with the vector.
    pub metadata: ChunkMetadata,
}

/// Scored match returned from a namespace query, ordered by descending score.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// Identifier of the matched vector.
    pub id: String,
    /// Cosine similarity score.
    pub score: f32,
    /// Metadata stored with the vector, if requested.
    pub metadata: Option<ChunkMetadata>,
}

/// Per-namespace and whole-index vector counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Vector counts keyed by namespace name.
    #[serde(default)]
    pub namespaces: HashMap<String, NamespaceStats>,
    /// Total number of vectors across all namespaces.
    #[serde(default)]
    pub total_vector_count: u64,
}

/// Vector count for a single namespace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceStats {
    /// Number of vectors currently stored in the namespace.
    pub vector_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeIndexResponse {
    pub(crate) dimension: usize,
    pub(crate) metric: String,
    pub(crate) host: String,
    pub(crate) status: IndexStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexStatus {
    pub(crate) ready: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertResponse {
    #[serde(default)]
    pub(crate) upserted_count: usize,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) matches: Vec<QueryResponseMatch>,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponseMatch {
    pub(crate) id: String,
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) metadata: Option<ChunkMetadata>,
}
