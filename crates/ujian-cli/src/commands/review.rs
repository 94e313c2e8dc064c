//! The `ujian review` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use ujian_core::parser;
use ujian_core::report::GradingReport;

pub fn execute(
    report_path: PathBuf,
    package_path: PathBuf,
    participant: Option<String>,
    question: Option<String>,
    score: Option<f64>,
) -> Result<()> {
    let mut report = GradingReport::load_json(&report_path)?;
    let package = parser::parse_package(&package_path)?;
    anyhow::ensure!(
        report.package.id == package.id,
        "report was graded against package '{}', not '{}'",
        report.package.id,
        package.id
    );

    match (participant, question, score) {
        (Some(participant), Some(question), Some(score)) => {
            report
                .apply_manual_score(&package, &participant, &question, score)
                .with_context(|| format!("cannot score {participant}/{question}"))?;
            report.save_json(&report_path)?;
            tracing::info!(%participant, %question, score, "manual score applied");

            let total = report
                .submission(&participant)
                .map(|s| (s.result.total_score, s.result.total_max, s.result.percentage()));
            if let Some((score, max, pct)) = total {
                println!("{participant}: {score}/{max} ({pct}%)");
            }
            println!("{} review(s) pending", report.aggregate.pending_reviews);
        }
        (None, None, None) => {
            let queue = report.review_queue();
            if queue.is_empty() {
                println!("No reviews pending.");
            }
            for item in &queue {
                println!(
                    "{}  {}  {}  max {}",
                    item.participant_id,
                    item.question_id,
                    item.kind,
                    item.max
                );
            }
        }
        _ => anyhow::bail!("--participant, --question and --score must be given together"),
    }

    Ok(())
}
