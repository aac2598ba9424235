use std::path::Path;

use super::{clean_text, truncate_text, ExtractionError, Extractor};

/// Reads text files directly
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

/// Check if extension is plain text
pub(crate) fn is_plain_text_ext(ext: &str) -> bool {
    matches!(
        ext,
        "txt" | "md" | "csv" | "json" | "xml" | "yaml" | "yml" | "log" | "html" | "htm" | "rst"
    )
}

impl Extractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;
        // Tolerate stray non-UTF-8 bytes instead of failing the document
        let text = String::from_utf8_lossy(&bytes);
        let text = truncate_text(&clean_text(&text));

        tracing::debug!(
            file = %path.display(),
            chars = text.len(),
            "[PlainTextExtractor] Direct read"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_text_extraction() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "This is a test document with some content.").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "It has multiple lines and words.").unwrap();

        let text = PlainTextExtractor.extract(file.path()).unwrap();
        assert_eq!(
            text,
            "This is a test document with some content.\nIt has multiple lines and words."
        );
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        file.write_all(b"sql \xff joins").unwrap();

        let text = PlainTextExtractor.extract(file.path()).unwrap();
        assert!(text.starts_with("sql"));
        assert!(text.ends_with("joins"));
    }
}
