//! Normalizer: maps raw text to a canonical token sequence.
//!
//! Policy, in order: lowercase, split into alphanumeric runs, drop stopwords and
//! tokens that are not purely alphabetic, lemmatize. A lemma that lands on a
//! stopword ("went" -> "go") is dropped too, which makes normalized text a fixed
//! point of the normalizer.

use std::collections::HashSet;

use crate::ranking::lemmatizer::Lemmatizer;
use crate::ranking::lexicon::STOP_WORDS;

/// Capability interface over the lexical resources. Implement this to swap the
/// stopword list or lemmatizer without touching the ranking logic.
///
/// Carried in `AppState` as `Arc<dyn TextNormalizer>`.
pub trait TextNormalizer: Send + Sync {
    fn tokens(&self, text: &str) -> Vec<String>;

    /// Whitespace-joined form consumed by the vector space builder.
    fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Owned English lexical resources, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct NormalizerContext {
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl NormalizerContext {
    pub fn english() -> Self {
        Self::with_extra_stopwords(std::iter::empty::<String>())
    }

    pub fn with_extra_stopwords<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stopwords: HashSet<String> = STOP_WORDS.iter().map(|w| w.to_string()).collect();
        stopwords.extend(extra.into_iter().map(Into::into));
        Self {
            stopwords,
            lemmatizer: Lemmatizer::english(),
        }
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl TextNormalizer for NormalizerContext {
    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        split_alphanumeric(&lowered)
            .filter(|token| is_alphabetic(token) && !self.is_stopword(token))
            .map(|token| self.lemmatizer.lemmatize(token))
            .filter(|lemma| !self.is_stopword(lemma))
            .collect()
    }
}

/// Maximal runs of alphanumeric characters.
fn split_alphanumeric(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

fn is_alphabetic(token: &str) -> bool {
    token.chars().all(char::is_alphabetic)
}
