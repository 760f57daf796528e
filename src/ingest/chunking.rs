//! Overlapping line-window chunking.
//!
//! Documents are chunked as fixed-size windows of extracted lines, with a
//! configurable line overlap (`stride`) between consecutive windows so that
//! sentences spanning a boundary stay visible to retrieval. The window start
//! advances by `chunk_size - stride` lines per step.

use thiserror::Error;

/// Errors produced while validating chunking parameters.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Chunk size of zero can never make progress.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap at or above the window size would duplicate windows forever.
    #[error("stride ({stride}) must be smaller than chunk size ({chunk_size})")]
    StrideTooLarge {
        /// Configured lines per chunk.
        chunk_size: usize,
        /// Configured line overlap between consecutive chunks.
        stride: usize,
    },
}

/// One window of document lines joined with newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Window content, lines joined with `\n`.
    pub text: String,
    /// 1-based position among emitted chunks; blank windows are skipped
    /// without consuming an index, so ids derived from it stay dense.
    pub index: usize,
}

/// Lazy, restartable iterator over overlapping line windows.
///
/// Cloning the iterator restarts it; chunking the same lines twice yields
/// identical sequences.
#[derive(Debug, Clone)]
pub struct ChunkWindows<'a> {
    lines: &'a [String],
    chunk_size: usize,
    step: usize,
    pos: usize,
    next_index: usize,
}

impl<'a> Iterator for ChunkWindows<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        while self.pos < self.lines.len() {
            let end = (self.pos + self.chunk_size).min(self.lines.len());
            let window = &self.lines[self.pos..end];

            // A window that reaches the end of the document is the last one;
            // stepping further would only re-emit tail lines.
            if end == self.lines.len() {
                self.pos = self.lines.len();
            } else {
                self.pos += self.step;
            }

            let text = window.join("\n");
            if text.trim().is_empty() {
                continue;
            }

            let index = self.next_index;
            self.next_index += 1;
            return Some(Chunk { text, index });
        }
        None
    }
}

/// Build a chunk iterator over `lines`, validating parameters before any
/// window is produced.
///
/// Fails fast with [`ChunkingError::StrideTooLarge`] when `stride >=
/// chunk_size`, which would otherwise loop on duplicate windows, and with
/// [`ChunkingError::InvalidChunkSize`] for a zero chunk size.
pub fn chunk_lines(
    lines: &[String],
    chunk_size: usize,
    stride: usize,
) -> Result<ChunkWindows<'_>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if stride >= chunk_size {
        return Err(ChunkingError::StrideTooLarge { chunk_size, stride });
    }

    Ok(ChunkWindows {
        lines,
        chunk_size,
        step: chunk_size - stride,
        pos: 0,
        next_index: 1,
    })
}
