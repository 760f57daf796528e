//! Pinecone vector store integration.

pub mod client;
pub mod types;

pub use client::PineconeService;
pub use types::{
    ChunkMetadata, IndexStats, NamespaceStats, PineconeError, QueryMatch, VectorRecord,
};
