//! Report Emitter: persists a `RankedReport` as a two-column CSV.
//!
//! Format (UTF-8, CRLF line endings):
//! ```text
//! Resume,Score
//! <identifier>,<score with two decimals>
//! ```
//! Writes go to a temp file in the destination directory which is then renamed
//! over the final path, so readers never observe a partial report.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::RankingError;
use crate::ranking::scorer::RankedReport;

pub const HEADER: [&str; 2] = ["Resume", "Score"];
const LINE_END: &str = "\r\n";

/// One row of a persisted report as read back by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub resume: String,
    pub score: f64,
}

/// Renders the full CSV document. Identical reports render to identical bytes.
pub fn render_report(report: &RankedReport) -> String {
    let mut out = String::new();
    push_record(&mut out, HEADER[0], HEADER[1]);
    for entry in report {
        push_record(&mut out, &entry.candidate, &entry.formatted_score());
    }
    out
}

/// Atomically replaces the report at `path`. On failure the previous report is left intact.
pub fn write_report(report: &RankedReport, path: &Path) -> Result<(), RankingError> {
    let io_err = |source: std::io::Error| RankingError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(render_report(report).as_bytes())
        .map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    info!(path = %path.display(), rows = report.len(), "Ranked report written");
    Ok(())
}

/// Parses a persisted report. The header row must match exactly.
pub fn parse_report(text: &str) -> anyhow::Result<Vec<ReportRow>> {
    let mut records = parse_records(text)?.into_iter();

    let header = records.next().ok_or_else(|| anyhow!("report is empty"))?;
    if header != HEADER {
        return Err(anyhow!("unexpected report header: {header:?}"));
    }

    records
        .enumerate()
        .map(|(i, record)| match record.as_slice() {
            [resume, score] => Ok(ReportRow {
                resume: resume.clone(),
                score: score
                    .parse::<f64>()
                    .with_context(|| format!("row {}: invalid score '{score}'", i + 1))?,
            }),
            _ => Err(anyhow!("row {}: expected 2 fields, found {}", i + 1, record.len())),
        })
        .collect()
}

/// Reads the report at `path`; `Ok(None)` when no report has been written yet.
pub fn read_report(path: &Path) -> anyhow::Result<Option<Vec<ReportRow>>> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_report(&text).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn push_record(out: &mut String, first: &str, second: &str) {
    push_field(out, first);
    out.push(',');
    push_field(out, second);
    out.push_str(LINE_END);
}

/// Minimal quoting: only fields containing a delimiter, quote or line break are quoted.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

fn parse_records(text: &str) -> anyhow::Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(anyhow!("unterminated quoted field"));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::scorer::rank_candidates;
    use crate::ranking::vectorizer::build_vector_space;

    fn sample_report() -> RankedReport {
        let space = build_vector_space(&[
            "senior backend engineer python",
            "senior backend engineer python",
            "graphic designer photoshop",
        ]);
        rank_candidates(
            &space.vectors[0],
            ["a.pdf", "b.pdf"].into_iter().zip(&space.vectors[1..]),
        )
    }

    #[test]
    fn test_render_exact_bytes() {
        assert_eq!(
            render_report(&sample_report()),
            "Resume,Score\r\na.pdf,100.00\r\nb.pdf,0.00\r\n"
        );
    }

    #[test]
    fn test_render_empty_report_is_header_only() {
        assert_eq!(render_report(&RankedReport::default()), "Resume,Score\r\n");
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        let mut out = String::new();
        push_record(&mut out, "smith, \"jr\".pdf", "12.50");
        assert_eq!(out, "\"smith, \"\"jr\"\".pdf\",12.50\r\n");
        let rows = parse_report(&format!("Resume,Score\r\n{out}")).unwrap();
        assert_eq!(rows[0].resume, "smith, \"jr\".pdf");
        assert_eq!(rows[0].score, 12.5);
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked_report.csv");
        write_report(&sample_report(), &path).unwrap();

        let rows = read_report(&path).unwrap().unwrap();
        assert_eq!(
            rows,
            vec![
                ReportRow {
                    resume: "a.pdf".into(),
                    score: 100.0
                },
                ReportRow {
                    resume: "b.pdf".into(),
                    score: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_write_replaces_previous_report_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked_report.csv");
        std::fs::write(&path, "stale").unwrap();

        write_report(&RankedReport::default(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Resume,Score\r\n");
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("latest.csv");
        write_report(&sample_report(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_to_file_parent_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();
        let err = write_report(&sample_report(), &blocker.join("report.csv")).unwrap_err();
        assert!(matches!(err, RankingError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_keeps_prior_report() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        std::fs::create_dir(&reports).unwrap();
        let path = reports.join("ranked_report.csv");
        let prior = "Resume,Score\r\nold.pdf,50.00\r\n";
        std::fs::write(&path, prior).unwrap();

        // Read-only directory: the temp file for the replacement cannot be created.
        std::fs::set_permissions(&reports, std::fs::Permissions::from_mode(0o555)).unwrap();
        if std::fs::write(reports.join("writable-check"), "x").is_ok() {
            // Privileged users ignore directory permissions; nothing to observe here.
            std::fs::set_permissions(&reports, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = write_report(&sample_report(), &path);
        std::fs::set_permissions(&reports, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(RankingError::Io { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), prior);
    }

    #[test]
    fn test_failed_persist_leaves_target_path_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the target cannot be replaced by a rename.
        let path = dir.path().join("ranked_report.csv");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.txt"), "kept").unwrap();

        let err = write_report(&sample_report(), &path).unwrap_err();
        assert!(matches!(err, RankingError::Io { .. }));

        assert_eq!(std::fs::read_to_string(path.join("keep.txt")).unwrap(), "kept");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_quoted_field_with_line_break_round_trips() {
        let mut out = String::new();
        push_record(&mut out, "two\r\nlines.pdf", "33.30");
        assert_eq!(out, "\"two\r\nlines.pdf\",33.30\r\n");

        let rows = parse_report(&format!("Resume,Score\r\n{out}b.pdf,1.00\r\n")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].resume, "two\r\nlines.pdf");
        assert_eq!(rows[0].score, 33.3);
        assert_eq!(rows[1].resume, "b.pdf");
    }

    #[test]
    fn test_read_missing_report_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_report(&dir.path().join("absent.csv")).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_header() {
        assert!(parse_report("Name,Value\r\na,1\r\n").is_err());
        assert!(parse_report("").is_err());
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(
            render_report(&sample_report()),
            render_report(&sample_report())
        );
    }
}
