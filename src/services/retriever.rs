//! Top-k similarity retrieval over the stored corpus.

use crate::error::QueryError;
use crate::models::{RankedChunk, RetrievalResult, StoredChunk};
use crate::services::embedder::TextEmbedder;
use crate::services::store::VectorStore;

/// Stateless retriever: every call embeds the query, scores the full chunk
/// set by cosine similarity, and returns the top-k ranked result. A
/// brute-force scan is deliberate at interactive corpus sizes.
pub struct Retriever<'a> {
    embedder: &'a dyn TextEmbedder,
    store: &'a VectorStore,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn TextEmbedder, store: &'a VectorStore) -> Self {
        Self { embedder, store }
    }

    pub fn retrieve(&self, query_text: &str, k: usize) -> Result<RetrievalResult, QueryError> {
        if k == 0 {
            return Err(QueryError::InvalidTopK);
        }
        if self.store.chunk_count()? == 0 {
            return Err(QueryError::EmptyStore);
        }

        let query_vector = self.embedder.embed(query_text)?;
        let chunks = self.store.all_chunks()?;
        let ranked = rank_chunks(&query_vector, chunks, k);

        Ok(RetrievalResult::new(query_text, ranked))
    }
}

/// Score, order, and truncate. Ties are broken by ascending chunk id so
/// equal-score results never reorder across runs.
fn rank_chunks(query_vector: &[f32], chunks: Vec<StoredChunk>, k: usize) -> Vec<RankedChunk> {
    let mut ranked: Vec<RankedChunk> = chunks
        .into_iter()
        .map(|chunk| {
            let score = cosine_similarity(query_vector, &chunk.embedding);
            RankedChunk::new(chunk, score)
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk.id.cmp(&b.chunk.id))
    });
    ranked.truncate(k);
    ranked
}

/// Cosine similarity of two vectors. Defined as exactly 0.0 when either
/// vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
