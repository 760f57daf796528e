#![deny(missing_docs)]

//! Core library for the loreforge knowledge pipeline.

/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Document ingestion pipeline: extraction, chunking, and upsert orchestration.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Pinecone vector store integration.
pub mod pinecone;
/// Prompt templates and context-aware prompt assembly.
pub mod prompt;
/// Namespace-scoped similarity retrieval.
pub mod retrieval;
