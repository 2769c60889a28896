// Resume ranking core.
// Extraction, normalization, joint TF-IDF fit, cosine ranking and CSV report.
// Everything here is synchronous; handlers run it inside spawn_blocking.

pub mod document;
pub mod extractor;
pub mod handlers;
pub mod lemmatizer;
pub mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod vectorizer;

#[cfg(test)]
pub(crate) mod test_support;
