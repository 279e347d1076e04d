use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::{AnswerOutcome, OutputFormat, RetrievalResult};
use crate::services::ChunkListing;

pub trait Formatter {
    fn format_retrieval(&self, result: &RetrievalResult) -> String;
    fn format_answer(&self, outcome: &AnswerOutcome) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_ingest_stats(&self, stats: &IngestStats) -> String;
    fn format_chunk_list(&self, listings: &[ChunkListing]) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub db_path: String,
    pub document_count: u64,
    pub chunk_count: u64,
    pub model_dir: String,
    pub model_present: bool,
    pub dimension: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub files_scanned: u64,
    pub files_ingested: u64,
    pub files_skipped: u64,
    pub chunks_indexed: u64,
    pub duration_ms: u64,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_retrieval(&self, result: &RetrievalResult) -> String {
        if result.is_empty() {
            return format!("No matching chunks for: {}\n", result.query);
        }

        let mut output = String::new();
        writeln!(output, "Top {} chunks for: \"{}\"\n", result.len(), result.query).unwrap();

        for (i, ranked) in result.ranked.iter().enumerate() {
            writeln!(
                output,
                "{}. [{}] score {:.3}",
                i + 1,
                ranked.citation,
                ranked.score
            )
            .unwrap();

            let preview: String = ranked.chunk.content.chars().take(200).collect();
            let preview = if ranked.chunk.content.chars().count() > 200 {
                format!("{}...", preview)
            } else {
                preview
            };
            for line in preview.lines() {
                writeln!(output, "   {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    fn format_answer(&self, outcome: &AnswerOutcome) -> String {
        let mut output = String::new();
        writeln!(output, "{}", outcome.answer.trim()).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Sources:").unwrap();
        for citation in outcome.retrieval.citations() {
            writeln!(output, "  - {}", citation).unwrap();
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Knowledge base").unwrap();
        writeln!(output, "--------------").unwrap();
        writeln!(output, "Database:   {}", status.db_path).unwrap();
        writeln!(output, "Documents:  {}", status.document_count).unwrap();
        writeln!(output, "Chunks:     {}", status.chunk_count).unwrap();
        writeln!(output, "Model dir:  {}", status.model_dir).unwrap();
        let model = if status.model_present {
            format!("present ({} dims)", status.dimension)
        } else {
            "missing".to_string()
        };
        writeln!(output, "Embedding:  {}", model).unwrap();
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "Ingestion complete in {}ms", stats.duration_ms).unwrap();
        writeln!(output, "  Files scanned:  {}", stats.files_scanned).unwrap();
        writeln!(output, "  Files ingested: {}", stats.files_ingested).unwrap();
        if stats.files_skipped > 0 {
            writeln!(output, "  Files skipped:  {}", stats.files_skipped).unwrap();
        }
        writeln!(output, "  Chunks indexed: {}", stats.chunks_indexed).unwrap();
        output
    }

    fn format_chunk_list(&self, listings: &[ChunkListing]) -> String {
        if listings.is_empty() {
            return "The knowledge base is empty.\n".to_string();
        }

        let mut output = String::new();
        for listing in listings {
            writeln!(
                output,
                "[{}] #{} ({} chars)",
                listing.citation(),
                listing.ordinal,
                listing.chars
            )
            .unwrap();
            writeln!(output, "   {}", listing.preview.replace('\n', " ")).unwrap();
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

pub struct JsonFormatter;

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

impl Formatter for JsonFormatter {
    fn format_retrieval(&self, result: &RetrievalResult) -> String {
        to_json(result)
    }

    fn format_answer(&self, outcome: &AnswerOutcome) -> String {
        to_json(outcome)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        to_json(status)
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        to_json(stats)
    }

    fn format_chunk_list(&self, listings: &[ChunkListing]) -> String {
        to_json(&listings)
    }

    fn format_message(&self, message: &str) -> String {
        to_json(&serde_json::json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        to_json(&serde_json::json!({ "error": error }))
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_retrieval(&self, result: &RetrievalResult) -> String {
        if result.is_empty() {
            return format!("No matching chunks for: `{}`\n", result.query);
        }

        let mut output = String::new();
        writeln!(output, "## Chunks for \"{}\"\n", result.query).unwrap();
        for ranked in &result.ranked {
            writeln!(
                output,
                "- **{}** (score {:.3})\n\n  > {}",
                ranked.citation,
                ranked.score,
                ranked.chunk.content.chars().take(200).collect::<String>()
            )
            .unwrap();
            writeln!(output).unwrap();
        }
        output
    }

    fn format_answer(&self, outcome: &AnswerOutcome) -> String {
        let mut output = String::new();
        writeln!(output, "{}\n", outcome.answer.trim()).unwrap();
        writeln!(output, "### Sources\n").unwrap();
        for citation in outcome.retrieval.citations() {
            writeln!(output, "- {}", citation).unwrap();
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Knowledge base\n").unwrap();
        writeln!(output, "| Field | Value |").unwrap();
        writeln!(output, "|---|---|").unwrap();
        writeln!(output, "| Database | `{}` |", status.db_path).unwrap();
        writeln!(output, "| Documents | {} |", status.document_count).unwrap();
        writeln!(output, "| Chunks | {} |", status.chunk_count).unwrap();
        writeln!(
            output,
            "| Embedding | {} |",
            if status.model_present {
                format!("{} dims", status.dimension)
            } else {
                "missing".to_string()
            }
        )
        .unwrap();
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "## Ingestion\n").unwrap();
        writeln!(output, "- Files scanned: {}", stats.files_scanned).unwrap();
        writeln!(output, "- Files ingested: {}", stats.files_ingested).unwrap();
        writeln!(output, "- Files skipped: {}", stats.files_skipped).unwrap();
        writeln!(output, "- Chunks indexed: {}", stats.chunks_indexed).unwrap();
        writeln!(output, "- Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_chunk_list(&self, listings: &[ChunkListing]) -> String {
        if listings.is_empty() {
            return "The knowledge base is empty.\n".to_string();
        }

        let mut output = String::new();
        writeln!(output, "| Source | Ordinal | Chars | Preview |").unwrap();
        writeln!(output, "|---|---|---|---|").unwrap();
        for listing in listings {
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                listing.citation(),
                listing.ordinal,
                listing.chars,
                listing.preview.replace('\n', " ").replace('|', "\\|")
            )
            .unwrap();
        }
        output
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("**Error:** {}", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RankedChunk, StoredChunk};

    fn sample_result() -> RetrievalResult {
        RetrievalResult::new(
            "test query",
            vec![RankedChunk::new(
                StoredChunk {
                    id: 1,
                    document_id: 1,
                    filename: "notes.pdf".to_string(),
                    page: 3,
                    ordinal: 0,
                    content: "Some chunk text".to_string(),
                    embedding: vec![],
                },
                0.875,
            )],
        )
    }

    #[test]
    fn test_text_retrieval_includes_citation_and_score() {
        let output = TextFormatter.format_retrieval(&sample_result());
        assert!(output.contains("notes.pdf, p3"));
        assert!(output.contains("0.875"));
        assert!(output.contains("Some chunk text"));
    }

    #[test]
    fn test_json_retrieval_is_parseable() {
        let output = JsonFormatter.format_retrieval(&sample_result());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["query"], "test query");
        assert_eq!(value["ranked"][0]["citation"], "notes.pdf, p3");
    }

    #[test]
    fn test_answer_lists_sources() {
        let outcome = AnswerOutcome {
            answer: "It is on page three [notes.pdf p3].".to_string(),
            retrieval: sample_result(),
        };
        let output = TextFormatter.format_answer(&outcome);
        assert!(output.contains("Sources:"));
        assert!(output.contains("- notes.pdf, p3"));
    }
}
