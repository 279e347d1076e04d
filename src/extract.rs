//! Text-extraction boundary.
//!
//! The ingestion pipeline accepts `(document_name, pages)` and does not care
//! where the pages came from. This adapter covers the CLI's own case: UTF-8
//! text documents, with form feeds marking page breaks. Richer extractors
//! (PDF, OCR) live upstream of this boundary.

use std::path::Path;

use crate::error::IngestionError;
use crate::models::PageText;
use crate::utils::{is_text_file, read_file_content};

/// Page separator recognized in plain-text documents.
const PAGE_BREAK: char = '\u{0C}';

/// Extract a document name and its per-page text from a file on disk.
pub fn extract_pages(
    path: &Path,
    max_file_size: u64,
) -> Result<(String, Vec<PageText>), IngestionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| IngestionError::Unreadable(format!("not a file: {}", path.display())))?;

    if !path.is_file() {
        return Err(IngestionError::Unreadable(format!(
            "not a file: {}",
            path.display()
        )));
    }
    if !is_text_file(path) {
        return Err(IngestionError::Unreadable(format!(
            "{}: only plain-text documents are supported here",
            path.display()
        )));
    }

    let content = read_file_content(path, max_file_size)
        .map_err(|e| IngestionError::Unreadable(format!("{}: {}", path.display(), e)))?;

    let pages = content
        .split(PAGE_BREAK)
        .enumerate()
        .map(|(i, text)| PageText::new(i as u32 + 1, text))
        .collect();

    Ok((name, pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one body of text").unwrap();

        let (name, pages) = extract_pages(&path, 1024).unwrap();
        assert_eq!(name, "notes.txt");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].text, "one body of text");
    }

    #[test]
    fn test_form_feed_splits_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "page one\u{0C}page two\u{0C}page three").unwrap();

        let (_, pages) = extract_pages(&path, 1024).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[2].text, "page three");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let result = extract_pages(Path::new("/nonexistent/doc.txt"), 1024);
        assert!(matches!(result, Err(IngestionError::Unreadable(_))));
    }

    #[test]
    fn test_oversized_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "a".repeat(100)).unwrap();

        let result = extract_pages(&path, 10);
        assert!(matches!(result, Err(IngestionError::Unreadable(_))));
    }
}
