//! Namespace-scoped similarity retrieval.

use crate::{
    config::Config,
    embedding::{EmbeddingClient, EmbeddingClientError},
    pinecone::{PineconeError, PineconeService, QueryMatch},
    retrieval::context::assemble_context,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors emitted while retrieving context for a query.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Query text was empty or whitespace-only.
    #[error("query text must not be empty")]
    EmptyQuery,
    /// Embedding provider failed to return a vector for the query.
    #[error("failed to embed query: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store query failed.
    #[error("Pinecone request failed: {0}")]
    Pinecone(#[from] PineconeError),
}

/// Source of retrieval context for prompt assembly.
///
/// Two implementations exist: [`RetrievalService`] backed by the knowledge
/// base, and [`NoopContextProvider`] which always returns empty context.
/// Selecting the variant at construction keeps call sites free of
/// enabled/disabled branching.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Retrieve a context string for `query` from `namespace`.
    async fn retrieve(&self, query: &str, namespace: &str) -> Result<String, RetrievalError>;
}

/// Context provider that always returns empty context.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopContextProvider;

#[async_trait]
impl ContextProvider for NoopContextProvider {
    async fn retrieve(&self, _query: &str, _namespace: &str) -> Result<String, RetrievalError> {
        Ok(String::new())
    }
}

/// Retrieval service querying the knowledge base for prompt context.
pub struct RetrievalService {
    config: Config,
    embedding_client: Arc<dyn EmbeddingClient>,
    pinecone: Arc<PineconeService>,
}

impl RetrievalService {
    /// Build a new retrieval service from its collaborators.
    pub fn new(
        config: Config,
        embedding_client: Arc<dyn EmbeddingClient>,
        pinecone: Arc<PineconeService>,
    ) -> Self {
        Self {
            config,
            embedding_client,
            pinecone,
        }
    }

    /// Retrieve a context string using the configured `top_k` and length
    /// budget.
    pub async fn retrieve_context(
        &self,
        query: &str,
        namespace: &str,
    ) -> Result<String, RetrievalError> {
        self.retrieve_context_with(
            query,
            namespace,
            self.config.retrieval_top_k,
            self.config.retrieval_max_context_chars,
        )
        .await
    }

    /// Retrieve a context string with explicit limits.
    ///
    /// A missing index or an empty namespace yields an empty string, not an
    /// error: retrieval is an enhancement, never a blocking dependency for
    /// generation.
    pub async fn retrieve_context_with(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
        max_context_chars: usize,
    ) -> Result<String, RetrievalError> {
        let matches = self.top_matches(query, namespace, top_k).await?;
        let context = assemble_context(&matches, max_context_chars);
        tracing::debug!(
            namespace,
            matches = matches.len(),
            context_chars = context.len(),
            "Context assembled"
        );
        Ok(context)
    }

    /// Return the raw scored matches for a query, descending by similarity.
    pub async fn top_matches(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }

        let vector = self.embedding_client.embed(query).await?;
        match self
            .pinecone
            .query(&self.config.pinecone_index_name, namespace, vector, top_k)
            .await
        {
            Ok(matches) => Ok(matches),
            Err(PineconeError::IndexNotFound(index)) => {
                tracing::warn!(index = %index, namespace, "Index missing; returning no matches");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ContextProvider for RetrievalService {
    async fn retrieve(&self, query: &str, namespace: &str) -> Result<String, RetrievalError> {
        self.retrieve_context(query, namespace).await
    }
}
