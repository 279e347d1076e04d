mod config;
mod document;
mod retrieval;

pub use config::{
    AnswerConfig, ChunkingConfig, Config, DEFAULT_ANSWER_MODEL, DEFAULT_API_BASE,
    DEFAULT_API_KEY_ENV, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, EmbeddingConfig,
    RetrievalConfig, StorageConfig,
};
pub use document::{ChunkDraft, Document, EmbeddedChunk, PageText, StoredChunk};
pub use retrieval::{AnswerOutcome, OutputFormat, RankedChunk, RetrievalResult};
