//! Vector Space Builder: joint TF-IDF fit over one ranking batch.
//!
//! `build_vector_space` is the single synchronization point of a run: it takes
//! the reference text and every candidate text together, because IDF weights are
//! only comparable between vectors fitted in the same batch.
//!
//! Weighting:
//! - features are whitespace tokens of at least two characters
//! - vocabulary sorted lexicographically, index = rank
//! - tf = raw count, idf(t) = ln((1 + N) / (1 + df(t))) + 1
//! - every vector is L2-normalized; all-zero vectors stay zero

use std::collections::BTreeMap;

const MIN_FEATURE_CHARS: usize = 2;

/// Distinct terms of one batch with their corpus-relative IDF weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSpace {
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl FeatureSpace {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|i| self.idf[i])
    }
}

/// Sparse document vector. Only non-zero weights are stored, sorted by feature index;
/// every other dimension up to `dimension` is implicitly zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl DocumentVector {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn magnitude(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Sparse dot product via a merge over the two sorted index lists.
    pub fn dot(&self, other: &DocumentVector) -> f64 {
        let (mut a, mut b) = (self.entries.iter().peekable(), other.entries.iter().peekable());
        let mut sum = 0.0;
        while let (Some(&&(ia, wa)), Some(&&(ib, wb))) = (a.peek(), b.peek()) {
            match ia.cmp(&ib) {
                std::cmp::Ordering::Less => {
                    a.next();
                }
                std::cmp::Ordering::Greater => {
                    b.next();
                }
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    a.next();
                    b.next();
                }
            }
        }
        sum
    }

    /// Zero-padded dense form, length `dimension`.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for &(i, w) in &self.entries {
            dense[i] = w;
        }
        dense
    }

    fn normalized(mut self) -> Self {
        let norm = self.magnitude();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Output of one joint fit: the feature space plus one vector per input text, in input order.
#[derive(Debug, Clone, Default)]
pub struct VectorSpace {
    pub features: FeatureSpace,
    pub vectors: Vec<DocumentVector>,
}

/// Fits TF-IDF over the whole batch `[reference, candidate_1, ..., candidate_n]`.
pub fn build_vector_space<S: AsRef<str>>(texts: &[S]) -> VectorSpace {
    let counts: Vec<BTreeMap<&str, usize>> = texts
        .iter()
        .map(|text| term_counts(text.as_ref()))
        .collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &counts {
        for term in doc.keys() {
            *document_frequency.entry(*term).or_insert(0) += 1;
        }
    }

    let n_docs = texts.len() as f64;
    let (terms, idf): (Vec<String>, Vec<f64>) = document_frequency
        .iter()
        .map(|(term, &df)| {
            let weight = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
            (term.to_string(), weight)
        })
        .unzip();
    let features = FeatureSpace { terms, idf };
    let dimension = features.len();

    let vectors = counts
        .iter()
        .map(|doc| {
            let entries = doc
                .iter()
                .filter_map(|(term, &tf)| {
                    features
                        .index_of(term)
                        .map(|i| (i, tf as f64 * features.idf[i]))
                })
                .collect();
            DocumentVector { dimension, entries }.normalized()
        })
        .collect();

    VectorSpace { features, vectors }
}

fn term_counts(text: &str) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for token in text
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_FEATURE_CHARS)
    {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}
