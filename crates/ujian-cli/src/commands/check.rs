//! The `ujian check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use ujian_core::answer::Submission;
use ujian_core::config::load_config_from;
use ujian_core::engine::evaluate;
use ujian_core::parser;

pub fn execute(
    package_path: PathBuf,
    submission_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let package = parser::parse_package(&package_path)?;
    let eval = super::package_eval(&config, &package);

    let content = std::fs::read_to_string(&submission_path)
        .with_context(|| format!("failed to read submission: {}", submission_path.display()))?;
    let submission: Submission = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission: {}", submission_path.display()))?;

    let result = evaluate(&package.questions, &submission.answers, &eval);

    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Score", "Max", "Status", "Feedback"]);
    for row in &result.results {
        let status = match (row.needs_review, row.correct) {
            (true, _) => "REVIEW",
            (false, Some(true)) => "OK",
            (false, _) if row.score > 0.0 => "PARTIAL",
            (false, _) => "WRONG",
        };
        table.add_row(vec![
            Cell::new(&row.question_id),
            Cell::new(row.kind.as_str()),
            Cell::new(row.score),
            Cell::new(row.max),
            Cell::new(status),
            Cell::new(row.feedback.as_deref().unwrap_or("")),
        ]);
    }

    let participant = if submission.participant_id.is_empty() {
        submission_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        submission.participant_id
    };

    println!("Package: {} | Participant: {participant}", package.name);
    println!("{table}");
    println!(
        "Total: {}/{} ({}%), {} question(s) need review",
        result.total_score,
        result.total_max,
        result.percentage(),
        result.needs_review_count
    );

    Ok(())
}
