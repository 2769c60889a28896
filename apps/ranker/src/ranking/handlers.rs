//! Axum route handlers for the Ranking API.

use std::collections::HashSet;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ranking::document::Document;
use crate::ranking::pipeline::{rank_and_persist, RunWarning};
use crate::ranking::report::{read_report, ReportRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

const JOB_DESCRIPTION_FIELD: &str = "jobdesc";
const RESUMES_FIELD: &str = "resumes";

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub report_path: String,
    pub entries: Vec<ReportRow>,
    pub warnings: Vec<RunWarning>,
}

#[derive(Debug, Serialize)]
pub struct LatestReportResponse {
    pub report_path: String,
    pub entries: Vec<ReportRow>,
}

/// Parsed multipart form. `None` means the field was never sent.
#[derive(Debug, Default)]
struct RankingForm {
    job_description: Option<String>,
    resumes: Option<Vec<Document>>,
    skipped: Vec<RunWarning>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rankings
///
/// Multipart form: `jobdesc` text plus one or more `resumes` PDF files.
/// Ranks the uploaded resumes, replaces the persisted report, and returns the ranking.
pub async fn handle_rank(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let form = read_form(multipart).await?;

    let run_id = Uuid::new_v4();
    let span = info_span!("ranking_run", %run_id);
    let report_path = state.config.report_path.clone();
    let normalizer = state.normalizer.clone();
    let extractor = state.extractor.clone();

    let RankingForm {
        job_description,
        resumes,
        skipped,
    } = form;

    let path = report_path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        info!(
            candidates = resumes.as_ref().map_or(0, Vec::len),
            "Starting ranking run"
        );
        rank_and_persist(
            job_description.as_deref(),
            resumes.as_deref(),
            normalizer.as_ref(),
            extractor.as_ref(),
            &path,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in ranking run: {e}")))??;

    let entries = outcome
        .report
        .iter()
        .map(|e| ReportRow {
            resume: e.candidate.clone(),
            score: e.display_score(),
        })
        .collect();

    let mut warnings = skipped;
    warnings.extend(outcome.warnings);

    Ok(Json(RankingResponse {
        run_id,
        generated_at: Utc::now(),
        report_path: report_path.display().to_string(),
        entries,
        warnings,
    }))
}

/// GET /api/v1/rankings/latest
///
/// Re-reads the persisted report.
pub async fn handle_latest(
    State(state): State<AppState>,
) -> Result<Json<LatestReportResponse>, AppError> {
    let path = state.config.report_path.clone();
    let read_path = path.clone();
    let rows = tokio::task::spawn_blocking(move || read_report(&read_path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed reading report: {e}")))??;

    let entries = rows.ok_or_else(|| AppError::NotFound("No ranking report yet".to_string()))?;
    Ok(Json(LatestReportResponse {
        report_path: path.display().to_string(),
        entries,
    }))
}

/// GET /api/v1/rankings/latest/download
///
/// Returns the persisted CSV as an attachment.
pub async fn handle_download(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = &state.config.report_path;
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("No ranking report yet".to_string()))
        }
        Err(e) => {
            return Err(AppError::Internal(
                anyhow::Error::new(e).context(format!("failed to read {}", path.display())),
            ))
        }
    };

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"ranked_report.csv\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Form handling
// ────────────────────────────────────────────────────────────────────────────

async fn read_form(mut multipart: Multipart) -> Result<RankingForm, AppError> {
    let mut form = RankingForm::default();
    let mut seen_names = HashSet::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable jobdesc: {e}")))?;
                // A blank job description is treated as absent.
                form.job_description = Some(text).filter(|t| !t.trim().is_empty());
            }
            Some(RESUMES_FIELD) => {
                let original = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable upload: {e}")))?;

                // Browsers send an empty part when no file was chosen; that is no candidate set.
                if original.is_empty() {
                    continue;
                }
                let resumes = form.resumes.get_or_insert_with(Vec::new);
                if !original.to_lowercase().ends_with(".pdf") {
                    warn!(file = %original, "Ignoring non-PDF upload");
                    form.skipped.push(RunWarning::SkippedUpload {
                        document: original,
                        reason: "only .pdf files are ranked".to_string(),
                    });
                    continue;
                }
                let name = secure_filename(&original);
                if !seen_names.insert(name.clone()) {
                    form.skipped.push(RunWarning::SkippedUpload {
                        document: original,
                        reason: format!("duplicate file name '{name}'"),
                    });
                    continue;
                }
                resumes.push(Document::new(name, content));
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Reduces an uploaded file name to a safe identifier: directory components are
/// dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
fn secure_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        "upload.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}
