//! Text Extractor: turns raw candidate bytes into a single text blob.
//!
//! `PdfTextExtractor` is the production backend. The pipeline only sees the
//! `TextExtractor` trait, so tests drive it with in-memory fakes.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::errors::ExtractionError;
use crate::ranking::document::Document;

/// Extracts plain text from one document.
///
/// Implementations must be pure with respect to the document bytes: the same
/// bytes always yield the same text or the same error.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<String, ExtractionError>;
}

/// PDF backend built on `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        let bytes = document.content.as_ref();

        // pdf-extract panics on some malformed inputs instead of returning an error.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        let pages = match outcome {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(ExtractionError::new(&document.name, e.to_string())),
            Err(_) => {
                return Err(ExtractionError::new(
                    &document.name,
                    "PDF parser aborted on malformed input",
                ))
            }
        };

        debug!(document = %document.name, pages = pages.len(), "Extracted PDF text");
        Ok(join_pages(pages))
    }
}

/// Concatenates per-page text in page order. Pages without text contribute nothing.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages.into_iter().fold(String::new(), |mut text, page| {
        text.push_str(page.as_ref());
        text
    })
}
