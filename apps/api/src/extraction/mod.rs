//! Text Extractor — turns an uploaded document's bytes into plain text.
//!
//! A completely unparseable document yields a typed `ExtractionFailure` that
//! the caller treats as "exclude this document, continue the batch" — never a
//! fatal error for the run.

pub mod prompts;
pub mod structuring;

use thiserror::Error;
use tracing::warn;

/// A document that could not be read. Carries the filename so the failure can
/// be surfaced in the needs-review workflow with enough context.
#[derive(Debug, Error)]
#[error("could not extract text from '{filename}': {cause}")]
pub struct ExtractionFailure {
    pub filename: String,
    pub cause: String,
}

/// Extracts plain text from a page-oriented PDF document.
///
/// Per-page text is concatenated in page order by the parser; pages with no
/// extractable text contribute empty strings and are not errors. Only a
/// corrupt document structure fails.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractionFailure> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("Extraction failed for '{filename}': {e}");
            Err(ExtractionFailure {
                filename: filename.to_string(),
                cause: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_document_yields_extraction_failure() {
        let garbage = b"this is not a pdf document at all";
        let err = extract_text(garbage, "broken.pdf").unwrap_err();
        assert_eq!(err.filename, "broken.pdf");
        assert!(!err.cause.is_empty());
    }

    #[test]
    fn test_failure_message_carries_document_identity() {
        let err = extract_text(b"\x00\x01\x02", "resume_42.pdf").unwrap_err();
        assert!(err.to_string().contains("resume_42.pdf"));
    }
}
