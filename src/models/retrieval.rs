//! Retrieval result models shared by the retriever, composer, and CLI.

use serde::{Deserialize, Serialize};

use super::document::StoredChunk;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
    /// Documentation-friendly Markdown format
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One retrieved chunk with its similarity score and citation label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedChunk {
    pub chunk: StoredChunk,
    /// Cosine similarity against the query vector.
    pub score: f32,
    pub citation: String,
}

impl RankedChunk {
    pub fn new(chunk: StoredChunk, score: f32) -> Self {
        let citation = chunk.citation();
        Self {
            chunk,
            score,
            citation,
        }
    }
}

/// Ordered top-k retrieval outcome for one query. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    /// Descending by score, at most k entries.
    pub ranked: Vec<RankedChunk>,
}

impl RetrievalResult {
    pub fn new(query: impl Into<String>, ranked: Vec<RankedChunk>) -> Self {
        Self {
            query: query.into(),
            ranked,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// The context handed to the answer composer: each snippet prefixed with
    /// its inline source marker.
    pub fn context_block(&self) -> String {
        self.ranked
            .iter()
            .map(|r| {
                format!(
                    "[Source: {} p{}]\n{}",
                    r.chunk.filename, r.chunk.page, r.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Deduplicated citation labels, in rank order.
    pub fn citations(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for r in &self.ranked {
            if !seen.contains(&r.citation) {
                seen.push(r.citation.clone());
            }
        }
        seen
    }
}

/// A composed answer together with the retrieval it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub answer: String,
    pub retrieval: RetrievalResult,
}
