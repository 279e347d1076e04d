//! Error types for the knowledge-base CLI.

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors related to embedding generation.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty or whitespace-only text")]
    EmptyInput,

    #[error("embedding model not found: {0}")]
    ModelNotFound(String),

    #[error("failed to load embedding model: {0}")]
    LoadError(String),

    #[error("tokenizer error: {0}")]
    TokenizerError(String),

    #[error("inference error: {0}")]
    InferenceError(String),

    #[error("malformed model output: expected {expected} components, got {actual}")]
    MalformedOutput { expected: usize, actual: usize },
}

/// Errors related to the vector store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open knowledge base at {path}: {message}")]
    OpenError { path: String, message: String },

    #[error("database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("invalid embedding vector: expected {expected} components, got {actual}")]
    InvalidVector { expected: usize, actual: usize },

    #[error("corrupt embedding blob: {0}")]
    CorruptVector(String),
}

/// Errors related to document ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("unreadable document: {0}")]
    Unreadable(String),

    #[error("no extractable text in document '{0}'")]
    NoExtractableText(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors related to retrieval queries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("top-k must be at least 1")]
    InvalidTopK,

    #[error("the knowledge base is empty")]
    EmptyStore,

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the answer composer boundary.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("API key not set: export {0} and try again")]
    MissingApiKey(String),

    #[error("completion request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("completion API error: {0}")]
    ApiError(String),

    #[error("completion timed out")]
    Timeout,

    #[error("model returned an empty answer")]
    EmptyAnswer,
}

impl Retryable for AnswerError {
    fn is_retryable(&self) -> bool {
        match self {
            AnswerError::Timeout => true,
            AnswerError::RequestError(e) => e.is_timeout() || e.is_connect(),
            // Rate limits and upstream hiccups are transient
            AnswerError::ApiError(msg) => {
                msg.contains("429")
                    || msg.contains("502")
                    || msg.contains("503")
                    || msg.contains("504")
                    || msg.to_lowercase().contains("unavailable")
                    || msg.to_lowercase().contains("too many requests")
            }
            AnswerError::MissingApiKey(_) | AnswerError::EmptyAnswer => false,
        }
    }
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("answer error: {0}")]
    Answer(#[from] AnswerError),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_error_retryability() {
        assert!(AnswerError::Timeout.is_retryable());
        assert!(AnswerError::ApiError("status 503: unavailable".into()).is_retryable());
        assert!(!AnswerError::ApiError("status 400: bad request".into()).is_retryable());
        assert!(!AnswerError::MissingApiKey("GROQ_API_KEY".into()).is_retryable());
        assert!(!AnswerError::EmptyAnswer.is_retryable());
    }
}
