//! Document Text Extraction
//!
//! Pure Rust text extraction behind the [`Extractor`] seam. The dispatcher
//! only ever sees `Result<String, ExtractionError>`; every failure mode of a
//! document (unreadable file, malformed PDF, a panicking parser) collapses
//! into an `ExtractionError` and the document is routed to `Others`.
//!
//! ## Supported Formats
//! - PDF: text extraction via pdf-extract
//! - Text: .txt, .md, .csv, .json, .xml, .html, ... (direct read)

mod pdf;
mod text;

pub use pdf::PdfExtractor;
pub(crate) use pdf::panic_message;
#[cfg(test)]
pub(crate) use pdf::sample_pdf;
pub use text::PlainTextExtractor;

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Maximum text length to extract (to avoid memory issues with huge docs)
pub const MAX_TEXT_LENGTH: usize = 500_000;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("extractor panicked: {0}")]
    Panicked(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("extraction timed out after {0:?}")]
    TimedOut(Duration),
}

/// Text extractor collaborator
///
/// Implementations are shared across worker threads and must not keep
/// per-document state.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Extractor that picks a concrete implementation by file extension
#[derive(Debug, Default)]
pub struct DocumentExtractor {
    pdf: PdfExtractor,
    text: PlainTextExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a file extension (without the dot) has an extractor
    pub fn is_supported(ext: &str) -> bool {
        let ext = ext.to_lowercase();
        ext == "pdf" || text::is_plain_text_ext(&ext)
    }
}

impl Extractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase());

        match ext.as_deref() {
            Some("pdf") => self.pdf.extract(path),
            Some(e) if text::is_plain_text_ext(e) => self.text.extract(path),
            other => Err(ExtractionError::Unsupported(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Trim every line and drop blank ones
pub(crate) fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate text to max length, preserving word boundaries
pub(crate) fn truncate_text(text: &str) -> String {
    if text.len() <= MAX_TEXT_LENGTH {
        return text.to_string();
    }

    let mut cut = MAX_TEXT_LENGTH;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &text[..cut];

    // Prefer a paragraph, then a line, then a word boundary
    if let Some(pos) = truncated.rfind("\n\n") {
        return truncated[..pos].to_string();
    }
    if let Some(pos) = truncated.rfind(char::is_whitespace) {
        return truncated[..pos].to_string();
    }

    truncated.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_supported() {
        assert!(DocumentExtractor::is_supported("pdf"));
        assert!(DocumentExtractor::is_supported("PDF"));
        assert!(DocumentExtractor::is_supported("txt"));
        assert!(!DocumentExtractor::is_supported("docx"));
        assert!(!DocumentExtractor::is_supported(""));
    }

    #[test]
    fn test_dispatches_plain_text() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "  Neural networks and backpropagation  ").unwrap();

        let text = DocumentExtractor::new().extract(file.path()).unwrap();
        assert_eq!(text, "Neural networks and backpropagation");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".bin").unwrap();
        let result = DocumentExtractor::new().extract(file.path());
        assert!(matches!(result, Err(ExtractionError::Unsupported(_))));
    }

    #[test]
    fn test_truncate_text() {
        let long_text = "a ".repeat(300_000);
        let truncated = truncate_text(&long_text);
        assert!(truncated.len() <= MAX_TEXT_LENGTH);
        assert!(truncated.ends_with('a'));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long_text = "é".repeat(MAX_TEXT_LENGTH);
        let truncated = truncate_text(&long_text);
        assert!(truncated.len() <= MAX_TEXT_LENGTH);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_clean_text() {
        let messy = "  Line 1  \n\n  Line 2  \n  \n  Line 3  ";
        assert_eq!(clean_text(messy), "Line 1\nLine 2\nLine 3");
    }
}
