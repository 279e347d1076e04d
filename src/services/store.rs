//! SQLite-backed vector store.
//!
//! Owns the `documents` and `chunks` tables. Embeddings are stored as
//! little-endian f32 blobs; batch inserts are transactional so retrieval
//! never observes a partially ingested document.

use std::path::Path;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::{Document, EmbeddedChunk, StoredChunk};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    page_count INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    page INTEGER NOT NULL,
    ordinal INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_document_id ON chunks(document_id);
"#;

/// Inspection row for the knowledge-base listing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkListing {
    pub id: i64,
    pub filename: String,
    pub page: u32,
    pub ordinal: u32,
    /// Full chunk length in characters.
    pub chars: u64,
    /// First 200 characters of the chunk.
    pub preview: String,
}

impl ChunkListing {
    pub fn citation(&self) -> String {
        format!("{}, p{}", self.filename, self.page)
    }
}

pub struct VectorStore {
    conn: Connection,
    dimension: usize,
}

impl VectorStore {
    /// Open (creating if needed) the knowledge base at `path`.
    pub fn open(path: &Path, dimension: usize) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::OpenError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| StorageError::OpenError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Insert a document and all of its chunks in one transaction.
    ///
    /// Any failure, including a chunk whose vector is not exactly
    /// `dimension` components, rolls back the entire batch.
    pub fn insert_document(
        &mut self,
        filename: &str,
        page_count: u32,
        checksum: &str,
        chunks: &[EmbeddedChunk],
    ) -> Result<(i64, usize), StorageError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO documents (filename, page_count, checksum, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                filename,
                page_count,
                checksum,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        let document_id = tx.last_insert_rowid();

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (document_id, page, ordinal, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for chunk in chunks {
                if chunk.embedding.len() != self.dimension {
                    return Err(StorageError::InvalidVector {
                        expected: self.dimension,
                        actual: chunk.embedding.len(),
                    });
                }
                stmt.execute(params![
                    document_id,
                    chunk.page,
                    chunk.ordinal,
                    chunk.content,
                    encode_embedding(&chunk.embedding),
                ])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok((document_id, inserted))
    }

    /// Delete every document and chunk. Clearing an empty store is a no-op.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM chunks", [])?;
        tx.execute("DELETE FROM documents", [])?;
        tx.commit()?;
        Ok(())
    }

    /// Every stored chunk with its decoded vector, in ascending-id order.
    pub fn all_chunks(&self) -> Result<Vec<StoredChunk>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.document_id, d.filename, c.page, c.ordinal, c.content, c.embedding
             FROM chunks c JOIN documents d ON d.id = c.document_id
             ORDER BY c.id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Vec<u8>>(6)?,
            ))
        })?;

        let mut chunks = Vec::new();
        for row in rows {
            let (id, document_id, filename, page, ordinal, content, blob) = row?;
            let embedding = decode_embedding(&blob, self.dimension)?;
            chunks.push(StoredChunk {
                id,
                document_id,
                filename,
                page,
                ordinal,
                content,
                embedding,
            });
        }
        Ok(chunks)
    }

    pub fn chunk_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn document_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn documents(&self) -> Result<Vec<Document>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, filename, page_count, checksum, created_at
             FROM documents ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Document {
                id: row.get(0)?,
                filename: row.get(1)?,
                page_count: row.get(2)?,
                checksum: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Read-only browsing view: citation plus a bounded content preview.
    pub fn list_chunks(&self, limit: u32) -> Result<Vec<ChunkListing>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, d.filename, c.page, c.ordinal, LENGTH(c.content), SUBSTR(c.content, 1, 200)
             FROM chunks c JOIN documents d ON d.id = c.document_id
             ORDER BY d.filename ASC, c.page ASC, c.ordinal ASC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(ChunkListing {
                id: row.get(0)?,
                filename: row.get(1)?,
                page: row.get(2)?,
                ordinal: row.get(3)?,
                chars: row.get::<_, i64>(4)? as u64,
                preview: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_embedding(blob: &[u8], dimension: usize) -> Result<Vec<f32>, StorageError> {
    let expected = dimension * 4;
    if blob.len() != expected {
        return Err(StorageError::CorruptVector(format!(
            "expected {} bytes, found {}",
            expected,
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 4;

    fn open_store(dir: &tempfile::TempDir) -> VectorStore {
        VectorStore::open(&dir.path().join("kb.db"), DIM).unwrap()
    }

    fn chunk(page: u32, ordinal: u32, content: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            page,
            ordinal,
            content: content.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let chunks = vec![
            chunk(1, 0, "first", vec![1.0, 0.0, 0.0, 0.0]),
            chunk(1, 1, "second", vec![0.0, 1.0, 0.0, 0.0]),
            chunk(2, 0, "third", vec![0.5, -0.5, 0.25, 0.0]),
        ];
        let (doc_id, inserted) = store
            .insert_document("notes.pdf", 2, "abc123", &chunks)
            .unwrap();
        assert_eq!(inserted, 3);

        assert_eq!(store.document_count().unwrap(), 1);
        assert_eq!(store.chunk_count().unwrap(), 3);

        let stored = store.all_chunks().unwrap();
        assert_eq!(stored.len(), 3);
        // Ascending-id order matches insertion order
        assert!(stored.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(stored[0].document_id, doc_id);
        assert_eq!(stored[0].filename, "notes.pdf");
        assert_eq!(stored[0].content, "first");
        assert_eq!(stored[2].embedding, vec![0.5, -0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_insert_is_atomic_on_invalid_vector() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store
            .insert_document(
                "a.txt",
                1,
                "aaa",
                &[chunk(1, 0, "ok", vec![1.0, 0.0, 0.0, 0.0])],
            )
            .unwrap();
        let before = store.chunk_count().unwrap();

        let bad_batch = vec![
            chunk(1, 0, "fine", vec![1.0, 0.0, 0.0, 0.0]),
            chunk(1, 1, "wrong dimension", vec![1.0, 0.0]),
        ];
        let err = store.insert_document("b.txt", 1, "bbb", &bad_batch);
        assert!(matches!(
            err,
            Err(StorageError::InvalidVector {
                expected: DIM,
                actual: 2
            })
        ));

        // Nothing from the failed batch is visible
        assert_eq!(store.chunk_count().unwrap(), before);
        assert_eq!(store.document_count().unwrap(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store
            .insert_document(
                "a.txt",
                1,
                "aaa",
                &[chunk(1, 0, "x", vec![0.0; DIM])],
            )
            .unwrap();
        assert_eq!(store.chunk_count().unwrap(), 1);

        store.clear().unwrap();
        assert_eq!(store.chunk_count().unwrap(), 0);
        assert_eq!(store.document_count().unwrap(), 0);

        // Second clear on an empty store is a no-op, not an error
        store.clear().unwrap();
        assert_eq!(store.chunk_count().unwrap(), 0);
    }

    #[test]
    fn test_embedding_blob_roundtrip() {
        let vector = vec![0.25f32, -1.5, 3.75, f32::MIN_POSITIVE];
        let decoded = decode_embedding(&encode_embedding(&vector), DIM).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(matches!(
            decode_embedding(&[0u8; 7], DIM),
            Err(StorageError::CorruptVector(_))
        ));
    }

    #[test]
    fn test_list_chunks_previews() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let long = "a".repeat(500);
        store
            .insert_document(
                "doc.txt",
                1,
                "ccc",
                &[chunk(3, 0, &long, vec![0.0; DIM])],
            )
            .unwrap();

        let listings = store.list_chunks(10).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].citation(), "doc.txt, p3");
        assert_eq!(listings[0].chars, 500);
        assert_eq!(listings[0].preview.len(), 200);
    }

    #[test]
    fn test_reopen_persists_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.db");
        {
            let mut store = VectorStore::open(&path, DIM).unwrap();
            store
                .insert_document(
                    "a.txt",
                    1,
                    "aaa",
                    &[chunk(1, 0, "persisted", vec![0.0; DIM])],
                )
                .unwrap();
        }
        let store = VectorStore::open(&path, DIM).unwrap();
        assert_eq!(store.chunk_count().unwrap(), 1);
        assert_eq!(store.all_chunks().unwrap()[0].content, "persisted");
    }
}
