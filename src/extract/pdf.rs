use std::any::Any;
use std::path::Path;

use super::{clean_text, truncate_text, ExtractionError, Extractor};

/// PDF text extraction using pdf-extract
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    /// Wrapped in catch_unwind: pdf-extract (and its font parsers) can panic
    /// on malformed fonts/glyphs
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;

        tracing::debug!(
            file = %path.display(),
            bytes = bytes.len(),
            "[PdfExtractor] Starting PDF extraction"
        );

        let text = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        })) {
            Ok(Ok(t)) => t,
            Ok(Err(e)) => return Err(ExtractionError::Pdf(e.to_string())),
            Err(panic) => return Err(ExtractionError::Panicked(panic_message(&*panic))),
        };

        let raw_len = text.len();
        let text = truncate_text(&clean_text(&text));

        if text.is_empty() {
            tracing::debug!(
                file = %path.display(),
                "[PdfExtractor] No text layer found, likely scanned/image-based"
            );
        }

        tracing::debug!(
            file = %path.display(),
            raw_chars = raw_len,
            chars = text.len(),
            "[PdfExtractor] Extraction complete"
        );

        Ok(text)
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Single-page PDF showing `lines` in Helvetica, with a valid xref table
#[cfg(test)]
pub(crate) fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("0 -16 Td\n");
        }
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({}) Tj\n", escaped));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extracts_text_layer() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(&sample_pdf(&["Python programming tutorial", "about scripting"]))
            .unwrap();

        let text = PdfExtractor.extract(file.path()).unwrap().to_lowercase();
        assert!(text.contains("python"), "extracted: {:?}", text);
        assert!(text.contains("scripting"), "extracted: {:?}", text);
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(b"this is not a pdf at all").unwrap();

        let result = PdfExtractor.extract(file.path());
        assert!(matches!(
            result,
            Err(ExtractionError::Pdf(_)) | Err(ExtractionError::Panicked(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PdfExtractor.extract(Path::new("/no/such/file.pdf"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("bad glyph");
        assert_eq!(panic_message(&*payload), "bad glyph");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bad font"));
        assert_eq!(panic_message(&*payload), "bad font");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "unknown panic");
    }
}
