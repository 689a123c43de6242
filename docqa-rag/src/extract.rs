//! Text extraction from source files.
//!
//! Extraction always yields a string for the chunker: when a PDF has no
//! usable text the result is a bracketed placeholder rather than an error.
//! Pages after the first are introduced by `--- PAGE n ---` marker lines, which
//! [`StructuredChunker`](crate::StructuredChunker) treats as section breaks.

use std::path::Path;

#[cfg(feature = "pdf")]
use tracing::{debug, warn};

use crate::error::Result;

/// Returned when a document contains no extractable text at all.
pub const NO_TEXT_PLACEHOLDER: &str =
    "[No text could be extracted from this PDF. It may be image-based or corrupted.]";

/// Pages with fewer non-whitespace characters than this are treated as empty.
const MIN_PAGE_CHARS: usize = 10;

/// A source of document text. Implementations are blocking; async callers
/// should run them on a blocking thread.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the file at `path`.
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Reads UTF-8 text files as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Extracts text from PDFs page by page with the `pdf-extract` crate.
///
/// Only available when the `pdf` feature is enabled.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        match pdf_extract::extract_text_by_pages(path) {
            Ok(pages) => {
                debug!(path = %path.display(), page_count = pages.len(), "extracted PDF pages");
                Ok(join_pages(&pages))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read PDF");
                Ok(format!("[Error reading PDF: {e}]"))
            }
        }
    }
}

/// Join per-page text with page markers, substituting placeholders for
/// pages, or whole documents, without usable text.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();

    for (i, page) in pages.iter().enumerate() {
        let number = i + 1;
        if i > 0 {
            text.push_str(&format!("\n\n--- PAGE {number} ---\n\n"));
        }
        if page.trim().chars().count() < MIN_PAGE_CHARS {
            text.push_str(&format!("[Page {number} - No extractable text]"));
        } else {
            text.push_str(page);
        }
    }

    let usable = pages.iter().any(|page| page.trim().chars().count() >= MIN_PAGE_CHARS);
    if !usable {
        return NO_TEXT_PLACEHOLDER.to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_joined_with_markers() {
        let pages = vec!["first page text".to_string(), "second page text".to_string()];
        assert_eq!(join_pages(&pages), "first page text\n\n--- PAGE 2 ---\n\nsecond page text");
    }

    #[test]
    fn empty_page_gets_placeholder() {
        let pages = vec!["first page text".to_string(), "   ".to_string()];
        assert!(join_pages(&pages).ends_with("[Page 2 - No extractable text]"));
    }

    #[test]
    fn document_without_text_gets_placeholder() {
        assert_eq!(join_pages(&[]), NO_TEXT_PLACEHOLDER);
        assert_eq!(join_pages(&["".to_string(), " \n".to_string()]), NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn plain_text_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "héllo\n\nworld").unwrap();
        assert_eq!(PlainTextExtractor.extract_text(&path).unwrap(), "héllo\n\nworld");
    }

    #[test]
    fn missing_plain_text_file_is_an_io_error() {
        let err = PlainTextExtractor.extract_text(Path::new("/nonexistent/doc.txt")).unwrap_err();
        assert!(matches!(err, crate::RagError::Io(_)));
    }
}
