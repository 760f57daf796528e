//! Document ingestion pipeline: extraction, chunking, embedding, and upsert.

pub mod chunking;
pub mod extract;
mod service;
pub mod types;

pub use chunking::{Chunk, ChunkWindows, ChunkingError, chunk_lines};
pub use extract::{ExtractError, PlainTextExtractor, TextExtractor};
pub use service::IngestService;
pub use types::{IngestError, IngestOutcome};
