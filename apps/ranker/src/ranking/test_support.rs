//! In-memory collaborators for tests that should not depend on real PDFs.

use crate::errors::ExtractionError;
use crate::ranking::document::Document;
use crate::ranking::extractor::TextExtractor;

/// Treats document bytes as UTF-8 text. Invalid UTF-8 or the corrupt marker fail extraction.
pub struct Utf8Extractor;

impl Utf8Extractor {
    pub const CORRUPT_MARKER: &'static str = "%CORRUPT%";
}

impl TextExtractor for Utf8Extractor {
    fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(&document.content)
            .map_err(|e| ExtractionError::new(&document.name, e.to_string()))?;
        if text == Self::CORRUPT_MARKER {
            return Err(ExtractionError::new(&document.name, "corrupt document"));
        }
        Ok(text.to_string())
    }
}
