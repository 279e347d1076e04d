//! Text chunking with overlap for optimal embedding.

use crate::models::{ChunkDraft, ChunkingConfig, PageText};
use crate::utils::normalize_ws;

/// Splits per-page text into overlapping fixed-size windows.
///
/// Pure segmentation: no embedding happens here. Window n starts exactly
/// `chunk_size - overlap` characters after window n-1, and the trailing
/// partial window is always emitted so no page tail is dropped.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Window size in characters
    chunk_size: usize,
    /// Overlap size in characters
    overlap: usize,
    /// Per-page cap applied before windowing
    max_page_chars: usize,
}

impl TextChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size as usize,
            overlap: config.chunk_overlap as usize,
            max_page_chars: config.max_page_chars as usize,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ChunkingConfig::default())
    }

    /// Chunk every page in order. Empty pages yield nothing; any page with
    /// text yields at least one chunk, even if shorter than the window.
    pub fn chunk_pages(&self, pages: &[PageText]) -> Vec<ChunkDraft> {
        let mut drafts = Vec::new();
        for page in pages {
            self.chunk_page(page, &mut drafts);
        }
        drafts
    }

    fn chunk_page(&self, page: &PageText, out: &mut Vec<ChunkDraft>) {
        let normalized = normalize_ws(&page.text);
        if normalized.is_empty() {
            return;
        }

        // Char indexing, never byte slicing: pages can hold any UTF-8.
        let mut chars: Vec<char> = normalized.chars().collect();
        chars.truncate(self.max_page_chars);
        let total = chars.len();

        let step = if self.chunk_size > self.overlap {
            self.chunk_size - self.overlap
        } else {
            self.chunk_size
        };

        let mut start = 0;
        let mut ordinal = 0u32;
        loop {
            let end = (start + self.chunk_size).min(total);
            out.push(ChunkDraft {
                page: page.number,
                ordinal,
                content: chars[start..end].iter().collect(),
            });
            if end == total {
                break;
            }
            start += step;
            ordinal += 1;
        }
    }
}
