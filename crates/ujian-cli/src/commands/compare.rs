//! The `ujian compare` command.

use std::path::PathBuf;

use anyhow::Result;

use ujian_core::report::{GradingReport, ScoreChange};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_change: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number"
    );
    let baseline = GradingReport::load_json(&baseline_path)?;
    let current = GradingReport::load_json(&current_path)?;

    if baseline.package.id != current.package.id {
        tracing::warn!(
            baseline = %baseline.package.id,
            current = %current.package.id,
            "comparing reports of different packages"
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} lowered, {} raised, {} unchanged",
                report.lowered.len(),
                report.raised.len(),
                report.unchanged
            );

            print_changes("Lowered", &report.lowered);
            print_changes("Raised", &report.raised);

            if report.new_participants > 0 {
                println!("\n{} new participant(s)", report.new_participants);
            }
            if report.removed_participants > 0 {
                println!("{} removed participant(s)", report.removed_participants);
            }
        }
    }

    if fail_on_change && report.has_changes() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[ScoreChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} {} ({}%) -> {} ({}%) ({:+})",
            c.participant_id,
            c.baseline_score,
            c.baseline_percentage,
            c.current_score,
            c.current_percentage,
            c.delta
        );
    }
}
