//! Document ingestion pipeline: pages -> chunks -> embeddings -> store.

use serde::{Deserialize, Serialize};

use crate::error::IngestionError;
use crate::models::{Document, EmbeddedChunk, PageText};
use crate::services::chunker::TextChunker;
use crate::services::embedder::TextEmbedder;
use crate::services::store::VectorStore;

/// Summary of one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub document_id: i64,
    pub filename: String,
    pub pages: u32,
    pub chunks_indexed: usize,
}

/// Ingest one document's extracted pages. All-or-nothing: the store commits
/// every chunk of the document or none of them.
pub fn ingest_document(
    embedder: &dyn TextEmbedder,
    store: &mut VectorStore,
    chunker: &TextChunker,
    name: &str,
    pages: &[PageText],
) -> Result<IngestReport, IngestionError> {
    let drafts = chunker.chunk_pages(pages);
    if drafts.is_empty() {
        return Err(IngestionError::NoExtractableText(name.to_string()));
    }

    let texts: Vec<String> = drafts.iter().map(|d| d.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts)?;

    let chunks: Vec<EmbeddedChunk> = drafts
        .into_iter()
        .zip(embeddings)
        .map(|(draft, embedding)| EmbeddedChunk::from_draft(draft, embedding))
        .collect();

    let checksum = Document::checksum_of(pages);
    let (document_id, chunks_indexed) =
        store.insert_document(name, pages.len() as u32, &checksum, &chunks)?;

    Ok(IngestReport {
        document_id,
        filename: name.to_string(),
        pages: pages.len() as u32,
        chunks_indexed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingError;
    use crate::models::ChunkingConfig;

    const DIM: usize = 4;

    struct StubEmbedder;

    impl TextEmbedder for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.trim().is_empty() {
                return Err(EmbeddingError::EmptyInput);
            }
            // Deterministic: derived from content length only
            Ok(vec![text.chars().count() as f32, 1.0, 0.0, 0.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    /// Always produces vectors of the wrong length.
    struct BrokenEmbedder;

    impl TextEmbedder for BrokenEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            DIM
        }
    }

    fn chunker() -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 20,
            ..Default::default()
        })
    }

    #[test]
    fn test_ingest_two_page_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::open(&dir.path().join("kb.db"), DIM).unwrap();

        let pages = vec![
            PageText::new(1, "a".repeat(250)),
            PageText::new(2, "short page"),
        ];
        let report =
            ingest_document(&StubEmbedder, &mut store, &chunker(), "manual.pdf", &pages).unwrap();

        // Page 1: windows at 0, 80, 160; page 2: one chunk
        assert_eq!(report.chunks_indexed, 4);
        assert_eq!(report.pages, 2);
        assert_eq!(store.chunk_count().unwrap(), 4);
        assert_eq!(store.document_count().unwrap(), 1);

        let stored = store.all_chunks().unwrap();
        assert!(stored.iter().all(|c| c.embedding.len() == DIM));
        assert_eq!(stored[3].page, 2);
        assert_eq!(stored[3].ordinal, 0);
    }

    #[test]
    fn test_ingest_rejects_document_with_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::open(&dir.path().join("kb.db"), DIM).unwrap();

        let pages = vec![PageText::new(1, ""), PageText::new(2, "   \n ")];
        let result = ingest_document(&StubEmbedder, &mut store, &chunker(), "blank.pdf", &pages);

        assert!(matches!(result, Err(IngestionError::NoExtractableText(_))));
        assert_eq!(store.document_count().unwrap(), 0);
    }

    #[test]
    fn test_failed_ingest_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::open(&dir.path().join("kb.db"), DIM).unwrap();

        let pages = vec![PageText::new(1, "valid text")];
        let result = ingest_document(&BrokenEmbedder, &mut store, &chunker(), "bad.pdf", &pages);

        assert!(result.is_err());
        assert_eq!(store.chunk_count().unwrap(), 0);
        assert_eq!(store.document_count().unwrap(), 0);
    }
}
