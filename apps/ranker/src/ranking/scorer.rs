//! Scorer/Ranker: cosine similarity against the reference and a stable descending sort.

use serde::Serialize;

use crate::ranking::vectorizer::DocumentVector;

/// Cosine similarity in [0, 1]. Zero when either vector has no magnitude; never NaN.
pub fn cosine_similarity(a: &DocumentVector, b: &DocumentVector) -> f64 {
    let denominator = a.magnitude() * b.magnitude();
    if denominator == 0.0 {
        return 0.0;
    }
    let similarity = a.dot(b) / denominator;
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}

/// One candidate and its raw similarity to the reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub candidate: String,
    /// Unrounded similarity in [0, 1]; all ordering decisions use this value.
    pub score: f64,
}

impl RankedEntry {
    /// Score on the 0–100 presentation scale, rounded to two decimals.
    pub fn display_score(&self) -> f64 {
        (self.score * 100.0 * 100.0).round() / 100.0
    }

    /// Fixed two-decimal rendering used by the persisted report.
    pub fn formatted_score(&self) -> String {
        format!("{:.2}", self.score * 100.0)
    }
}

/// Candidates ordered by descending score. Only successfully processed candidates appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedReport {
    entries: Vec<RankedEntry>,
}

impl RankedReport {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RankedReport {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Scores every candidate against the reference and sorts descending.
///
/// The sort is stable, so candidates with equal unrounded scores keep their input order.
pub fn rank_candidates<'a, I>(reference: &DocumentVector, candidates: I) -> RankedReport
where
    I: IntoIterator<Item = (&'a str, &'a DocumentVector)>,
{
    let mut entries: Vec<RankedEntry> = candidates
        .into_iter()
        .map(|(name, vector)| RankedEntry {
            candidate: name.to_string(),
            score: cosine_similarity(reference, vector),
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));

    RankedReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::vectorizer::build_vector_space;

    #[test]
    fn test_identical_vectors_score_one() {
        let space = build_vector_space(&["rust python kafka", "rust python kafka"]);
        let score = cosine_similarity(&space.vectors[0], &space.vectors[1]);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_vectors_score_zero() {
        let space = build_vector_space(&["rust python", "photoshop illustrator"]);
        assert_eq!(cosine_similarity(&space.vectors[0], &space.vectors[1]), 0.0);
    }

    #[test]
    fn test_zero_vector_scores_zero_not_nan() {
        let space = build_vector_space(&["", "rust"]);
        let score = cosine_similarity(&space.vectors[0], &space.vectors[1]);
        assert_eq!(score, 0.0);
        let both_empty = build_vector_space(&["", ""]);
        assert_eq!(
            cosine_similarity(&both_empty.vectors[0], &both_empty.vectors[1]),
            0.0
        );
    }

    #[test]
    fn test_rank_sorts_descending() {
        let space = build_vector_space(&[
            "rust python kafka",
            "photoshop",
            "rust python kafka",
            "rust golang",
        ]);
        let names = ["none", "exact", "partial"];
        let report = rank_candidates(
            &space.vectors[0],
            names.iter().copied().zip(&space.vectors[1..]),
        );
        let order: Vec<&str> = report.iter().map(|e| e.candidate.as_str()).collect();
        assert_eq!(order, vec!["exact", "partial", "none"]);
        assert!(report
            .entries()
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let space = build_vector_space(&["rust", "go", "kafka", "scala"]);
        let names = ["first", "second", "third"];
        let report = rank_candidates(
            &space.vectors[0],
            names.iter().copied().zip(&space.vectors[1..]),
        );
        let order: Vec<&str> = report.iter().map(|e| e.candidate.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sort_uses_unrounded_scores() {
        // Every term appears in every document, so idf is uniform and only the
        // alpha/beta ratio moves the cosine.
        let near = format!("{}{}", "alpha ".repeat(100), "beta ".repeat(99));
        let exact = format!("{}{}", "alpha ".repeat(100), "beta ".repeat(100));
        let space = build_vector_space(&["alpha beta", near.as_str(), exact.as_str()]);

        let report = rank_candidates(
            &space.vectors[0],
            ["near", "exact"].into_iter().zip(&space.vectors[1..]),
        );
        let entries = report.entries();

        // Both render as 100.00; the raw cosine still decides, overriding input order.
        assert_eq!(entries[0].formatted_score(), entries[1].formatted_score());
        assert!(entries[0].score - entries[1].score < 0.000_05);
        assert!(entries[0].score > entries[1].score);
        assert_eq!(entries[0].candidate, "exact");
        assert_eq!(entries[1].candidate, "near");
    }

    #[test]
    fn test_rank_empty_candidates() {
        let reference = build_vector_space(&["rust"]).vectors.remove(0);
        assert!(rank_candidates(&reference, std::iter::empty()).is_empty());
    }

    #[test]
    fn test_display_and_formatted_scores() {
        let entry = RankedEntry {
            candidate: "a.pdf".into(),
            score: 0.456_789,
        };
        assert_eq!(entry.formatted_score(), "45.68");
        assert!((entry.display_score() - 45.68).abs() < 1e-9);

        let full = RankedEntry {
            candidate: "b.pdf".into(),
            score: 1.0,
        };
        assert_eq!(full.formatted_score(), "100.00");
        let none = RankedEntry {
            candidate: "c.pdf".into(),
            score: 0.0,
        };
        assert_eq!(none.formatted_score(), "0.00");
    }
}
