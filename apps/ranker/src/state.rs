use std::sync::Arc;

use crate::config::Config;
use crate::ranking::extractor::TextExtractor;
use crate::ranking::normalizer::TextNormalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Lexical resources loaded once at startup. Default: `NormalizerContext::english`.
    pub normalizer: Arc<dyn TextNormalizer>,
    /// Pluggable text extraction backend. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
}
