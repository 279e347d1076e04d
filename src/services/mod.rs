mod chunker;
mod composer;
mod embedder;
mod ingest;
mod retriever;
mod store;

pub use chunker::TextChunker;
pub use composer::AnswerComposer;
pub use embedder::{Embedder, TextEmbedder};
pub use ingest::{IngestReport, ingest_document};
pub use retriever::{Retriever, cosine_similarity};
pub use store::{ChunkListing, VectorStore};
