use serde::{Deserialize, Serialize};

/// A stored source document. Immutable once ingested; removed only by a
/// knowledge-base clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub page_count: u32,
    pub checksum: String,
    pub created_at: String,
}

impl Document {
    pub fn checksum_of(pages: &[PageText]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for page in pages {
            hasher.update(page.text.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(&hasher.finalize()[..16])
    }
}

/// Extracted text of a single document page, 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A chunk produced by the chunker, before any embedding is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDraft {
    pub page: u32,
    /// Zero-based position within the page.
    pub ordinal: u32,
    pub content: String,
}

/// A chunk paired with its embedding, ready for insertion.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub page: u32,
    pub ordinal: u32,
    pub content: String,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn from_draft(draft: ChunkDraft, embedding: Vec<f32>) -> Self {
        Self {
            page: draft.page,
            ordinal: draft.ordinal,
            content: draft.content,
            embedding,
        }
    }
}

/// A chunk as read back from the store, joined with its document's filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: i64,
    pub document_id: i64,
    pub filename: String,
    pub page: u32,
    pub ordinal: u32,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    /// Human-readable source reference, derived from document and page.
    pub fn citation(&self) -> String {
        format!("{}, p{}", self.filename, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_label() {
        let chunk = StoredChunk {
            id: 7,
            document_id: 1,
            filename: "notes.pdf".to_string(),
            page: 3,
            ordinal: 0,
            content: "...".to_string(),
            embedding: vec![],
        };
        assert_eq!(chunk.citation(), "notes.pdf, p3");
    }

    #[test]
    fn test_checksum_is_stable_and_page_sensitive() {
        let pages = vec![PageText::new(1, "alpha"), PageText::new(2, "beta")];
        let a = Document::checksum_of(&pages);
        let b = Document::checksum_of(&pages);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let merged = vec![PageText::new(1, "alphabeta")];
        assert_ne!(a, Document::checksum_of(&merged));
    }
}
