//! Ranking pipeline driver.
//!
//! Extract → normalize (reference and each candidate) → joint TF-IDF fit →
//! cosine ranking → report. Per-candidate extraction failures are collected as
//! warnings; only missing input or a failed report write abort the run.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{ExtractionError, RankingError};
use crate::ranking::document::Document;
use crate::ranking::extractor::TextExtractor;
use crate::ranking::normalizer::TextNormalizer;
use crate::ranking::report::write_report;
use crate::ranking::scorer::{rank_candidates, RankedReport};
use crate::ranking::vectorizer::build_vector_space;

/// Non-fatal conditions observed during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// The candidate was dropped from the report.
    ExtractionFailed(ExtractionError),
    /// No candidate survived extraction; the report is header-only.
    EmptyCandidateSet,
    /// An upload was not submitted to the pipeline at all.
    SkippedUpload { document: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct RankingOutcome {
    pub report: RankedReport,
    pub warnings: Vec<RunWarning>,
}

impl RankingOutcome {
    /// Candidates excluded because their text could not be extracted.
    pub fn failures(&self) -> impl Iterator<Item = &ExtractionError> {
        self.warnings.iter().filter_map(|w| match w {
            RunWarning::ExtractionFailed(e) => Some(e),
            _ => None,
        })
    }
}

/// A candidate whose text was extracted and normalized.
struct PreparedCandidate<'a> {
    name: &'a str,
    text: String,
}

/// Ranks `candidates` against `reference` without persisting anything.
///
/// `None` for either input is a missing-input error; an empty candidate list is not.
pub fn rank_documents(
    reference: Option<&str>,
    candidates: Option<&[Document]>,
    normalizer: &dyn TextNormalizer,
    extractor: &dyn TextExtractor,
) -> Result<RankingOutcome, RankingError> {
    let reference = reference
        .ok_or_else(|| RankingError::MissingInput("job description is required".to_string()))?;
    let candidates = candidates
        .ok_or_else(|| RankingError::MissingInput("candidate set is required".to_string()))?;

    let reference_text = normalizer.normalize(reference);

    let mut warnings = Vec::new();
    let mut prepared = Vec::with_capacity(candidates.len());
    for document in candidates {
        match extractor.extract(document) {
            Ok(raw) => prepared.push(PreparedCandidate {
                name: &document.name,
                text: normalizer.normalize(&raw),
            }),
            Err(e) => {
                warn!(document = %e.document, reason = %e.reason, "Skipping candidate");
                warnings.push(RunWarning::ExtractionFailed(e));
            }
        }
    }

    if prepared.is_empty() {
        info!("No valid candidates; producing header-only report");
        warnings.push(RunWarning::EmptyCandidateSet);
    }

    // Single joint fit over reference + every surviving candidate.
    let mut batch = Vec::with_capacity(prepared.len() + 1);
    batch.push(reference_text.as_str());
    batch.extend(prepared.iter().map(|c| c.text.as_str()));
    let space = build_vector_space(&batch);

    let report = match space.vectors.split_first() {
        Some((reference_vector, candidate_vectors)) => rank_candidates(
            reference_vector,
            prepared.iter().map(|c| c.name).zip(candidate_vectors),
        ),
        None => RankedReport::default(),
    };

    info!(
        ranked = report.len(),
        failed = candidates.len() - prepared.len(),
        features = space.features.len(),
        "Ranking complete"
    );

    Ok(RankingOutcome { report, warnings })
}

/// Ranks and then atomically persists the report at `report_path`.
///
/// Nothing is written when ranking fails, so an earlier report survives.
pub fn rank_and_persist(
    reference: Option<&str>,
    candidates: Option<&[Document]>,
    normalizer: &dyn TextNormalizer,
    extractor: &dyn TextExtractor,
    report_path: &Path,
) -> Result<RankingOutcome, RankingError> {
    let outcome = rank_documents(reference, candidates, normalizer, extractor)?;
    write_report(&outcome.report, report_path)?;
    Ok(outcome)
}
