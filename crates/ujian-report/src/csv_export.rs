//! CSV score sheet: one row per graded participant.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use ujian_core::report::GradingReport;

#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    participant_id: &'a str,
    total_score: f64,
    total_max: f64,
    percentage: u32,
    needs_review: usize,
}

/// Render the score sheet as CSV text, header included.
pub fn generate_csv(report: &GradingReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for s in &report.submissions {
        writer
            .serialize(ScoreRow {
                participant_id: &s.participant_id,
                total_score: s.result.total_score,
                total_max: s.result.total_max,
                percentage: s.result.percentage(),
                needs_review: s.result.needs_review_count,
            })
            .with_context(|| format!("failed to write CSV row for {}", s.participant_id))?;
    }
    // With no rows serde never emits the header.
    if report.submissions.is_empty() {
        writer.write_record([
            "participant_id",
            "total_score",
            "total_max",
            "percentage",
            "needs_review",
        ])?;
    }
    let bytes = writer.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write the score sheet to a file.
pub fn write_csv_report(report: &GradingReport, path: &Path) -> Result<()> {
    let csv = generate_csv(report)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write CSV report: {}", path.display()))?;
    Ok(())
}
