//! File utilities for the ingestion adapter.

use std::fs;
use std::io::Read;
use std::path::Path;

/// Check if a file is likely plain text.
pub fn is_text_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        if matches!(ext.as_str(), "txt" | "md" | "markdown" | "text" | "rst") {
            return true;
        }
        // Anything with a known binary extension is out
        if matches!(
            ext.as_str(),
            "pdf" | "png" | "jpg" | "jpeg" | "gif" | "zip" | "gz" | "tar" | "exe" | "so" | "db"
        ) {
            return false;
        }
    }

    // Sniff the first bytes for null markers
    if let Ok(file) = fs::File::open(path) {
        let mut buffer = [0u8; 512];
        let mut reader = std::io::BufReader::new(file);
        if let Ok(n) = reader.read(&mut buffer) {
            if n == 0 {
                return true;
            }
            return !buffer[..n].contains(&0);
        }
    }

    false
}

/// Read file content with a size limit.
pub fn read_file_content(path: &Path, max_size: u64) -> std::io::Result<String> {
    let metadata = fs::metadata(path)?;

    if metadata.len() > max_size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "file exceeds maximum size: {} > {}",
                metadata.len(),
                max_size
            ),
        ));
    }

    fs::read_to_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_extension_detection() {
        assert!(is_text_file(Path::new("notes.txt")));
        assert!(is_text_file(Path::new("README.md")));
        assert!(!is_text_file(Path::new("scan.pdf")));
    }

    #[test]
    fn test_null_byte_sniffing() {
        let dir = tempfile::tempdir().unwrap();

        let text_path = dir.path().join("plain");
        fs::write(&text_path, "just words\n").unwrap();
        assert!(is_text_file(&text_path));

        let binary_path = dir.path().join("blob");
        let mut f = fs::File::create(&binary_path).unwrap();
        f.write_all(&[0x7f, 0x00, 0x01, 0x02]).unwrap();
        assert!(!is_text_file(&binary_path));
    }

    #[test]
    fn test_read_respects_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "0123456789").unwrap();

        assert!(read_file_content(&path, 5).is_err());
        assert_eq!(read_file_content(&path, 100).unwrap(), "0123456789");
    }
}
