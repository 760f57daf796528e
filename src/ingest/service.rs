//! Ingestion service coordinating extraction, chunking, embedding, and upsert.

use crate::{
    config::Config,
    embedding::EmbeddingClient,
    ingest::{
        chunking::{Chunk, chunk_lines},
        extract::TextExtractor,
        types::{IngestError, IngestOutcome},
    },
    metrics::{IngestMetrics, MetricsSnapshot},
    pinecone::{ChunkMetadata, PineconeService, VectorRecord},
};
use std::path::Path;
use std::sync::Arc;

/// Number of chunk texts sent to the embedding provider per request.
const EMBED_BATCH_SIZE: usize = 32;

/// Number of vector records sent to Pinecone per upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// Coordinates the end-to-end ingestion of one document into one namespace.
///
/// The service owns long-lived handles to the extractor, embedding client,
/// and Pinecone transport; construct it once near process start and share it
/// through an `Arc`.
pub struct IngestService {
    config: Config,
    extractor: Box<dyn TextExtractor>,
    embedding_client: Arc<dyn EmbeddingClient>,
    pinecone: Arc<PineconeService>,
    metrics: Arc<IngestMetrics>,
}

impl IngestService {
    /// Build a new ingestion service from its collaborators.
    pub fn new(
        config: Config,
        extractor: Box<dyn TextExtractor>,
        embedding_client: Arc<dyn EmbeddingClient>,
        pinecone: Arc<PineconeService>,
    ) -> Self {
        Self {
            config,
            extractor,
            embedding_client,
            pinecone,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Whether the configured extractor recognizes the file at `path`.
    pub fn supports(&self, path: &Path) -> bool {
        self.extractor.supports(path)
    }

    /// Ingest one document into one namespace of the configured index.
    ///
    /// Steps: extract lines, chunk, embed (batched), assign
    /// `{doc_id_prefix}_{n}` vector ids, upsert. The operation is idempotent
    /// per `(doc_id_prefix, namespace, index)`: re-running with identical
    /// input overwrites vectors instead of accumulating duplicates.
    /// Concurrent upserts under the *same* prefix race on overwrite order and
    /// should be serialized by the caller if strict ordering matters.
    ///
    /// Extraction failures abort before any network call. Embedding failures
    /// abort the whole document: every batch is embedded before the first
    /// upsert is issued, so a document is never partially written.
    pub async fn upsert_document(
        &self,
        path: &Path,
        namespace: &str,
        doc_id_prefix: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        let source = file_name(path);
        let prefix = doc_id_prefix
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(path));

        tracing::info!(document = %source, namespace, prefix = %prefix, "Ingesting document");

        let lines = self.extractor.extract_lines(path)?;
        tracing::debug!(document = %source, lines = lines.len(), "Extraction complete");

        let chunks: Vec<Chunk> =
            chunk_lines(&lines, self.config.chunk_size, self.config.stride)?.collect();
        if chunks.is_empty() {
            tracing::warn!(document = %source, "Document produced no chunks; nothing to upsert");
            return Ok(IngestOutcome {
                doc_id_prefix: prefix,
                chunk_count: 0,
                vectors_upserted: 0,
            });
        }

        self.pinecone
            .ensure_index(&self.config.pinecone_index_name)
            .await?;

        // Embed everything up front; an embedding failure must not leave a
        // partially written document in the namespace.
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedding_client.embed_batch(&texts).await?;
            embeddings.extend(vectors);
        }
        debug_assert_eq!(chunks.len(), embeddings.len());

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| VectorRecord {
                id: format!("{prefix}_{}", chunk.index),
                values,
                metadata: ChunkMetadata {
                    text: chunk.text.clone(),
                    source: source.clone(),
                    chunk_index: chunk.index,
                },
            })
            .collect();

        let mut upserted = 0;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            upserted += self
                .pinecone
                .upsert(&self.config.pinecone_index_name, namespace, batch.to_vec())
                .await?;
        }

        self.metrics.record_document(upserted as u64);
        tracing::info!(
            document = %source,
            namespace,
            chunks = chunks.len(),
            vectors = upserted,
            "Document ingested"
        );

        Ok(IngestOutcome {
            doc_id_prefix: prefix,
            chunk_count: chunks.len(),
            vectors_upserted: upserted,
        })
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}
