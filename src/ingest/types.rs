//! Error and outcome types for the ingestion pipeline.

use crate::embedding::EmbeddingClientError;
use crate::ingest::chunking::ChunkingError;
use crate::ingest::extract::ExtractError;
use crate::pinecone::PineconeError;
use thiserror::Error;

/// Errors emitted by the document ingestion pipeline.
///
/// Any failure aborts the current document only; previously ingested
/// documents and other namespaces are unaffected.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source document could not be read or decoded.
    #[error("failed to extract document text: {0}")]
    Extract(#[from] ExtractError),
    /// Chunking parameters were invalid.
    #[error("failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce vectors after retries.
    #[error("failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store interaction failed.
    #[error("Pinecone request failed: {0}")]
    Pinecone(#[from] PineconeError),
}

/// Summary of a completed single-document ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Identifier prefix the document's vector ids were derived from.
    pub doc_id_prefix: String,
    /// Number of chunks produced for the document.
    pub chunk_count: usize,
    /// Number of vectors written to the namespace.
    pub vectors_upserted: usize,
}
