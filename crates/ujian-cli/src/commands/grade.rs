//! The `ujian grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use ujian_core::batch::{BatchConfig, BatchGrader, ProgressReporter};
use ujian_core::config::load_config_from;
use ujian_core::parser;
use ujian_core::report::{GradedSubmission, GradingReport};
use ujian_core::store::DirectoryAnswerStore;
use ujian_report::csv_export::write_csv_report;
use ujian_report::html::write_html_report;

pub struct GradeArgs {
    pub package: PathBuf,
    pub answers: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
    pub no_partial_credit: bool,
    pub penalty: Option<f64>,
    pub parallelism: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, _participant_id: &str) {}

    fn on_submission_graded(&self, graded: &GradedSubmission) {
        let r = &graded.result;
        let review = if r.needs_review_count > 0 {
            format!(", {} to review", r.needs_review_count)
        } else {
            String::new()
        };
        eprintln!(
            "  Graded: {} {}/{} ({}%){review}",
            graded.participant_id,
            r.total_score,
            r.total_max,
            r.percentage()
        );
    }

    fn on_submission_error(&self, participant_id: &str, error: &str) {
        eprintln!("  ERROR: {participant_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(args: GradeArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let package = parser::parse_package(&args.package)?;

    let mut eval = super::package_eval(&config, &package);
    if args.no_partial_credit {
        eval.allow_partial_credit = false;
    }
    if let Some(penalty) = args.penalty {
        anyhow::ensure!(
            penalty.is_finite() && penalty >= 0.0,
            "penalty must be a non-negative number"
        );
        eval.wrong_pick_penalty_per_option = penalty;
    }

    let parallelism = args.parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    anyhow::ensure!(
        args.answers.is_dir(),
        "answers directory not found: {}",
        args.answers.display()
    );

    let formats: Vec<&str> = if args.format == "all" {
        vec!["json", "html", "csv"]
    } else {
        args.format.split(',').map(str::trim).collect()
    };
    if let Some(bad) = formats
        .iter()
        .find(|f| !matches!(**f, "json" | "html" | "csv"))
    {
        anyhow::bail!("unknown format '{bad}' (expected json, html, csv or all)");
    }

    eprintln!(
        "ujian v{} - Grading '{}' ({} questions, {} points)",
        env!("CARGO_PKG_VERSION"),
        package.name,
        package.questions.len(),
        package.total_points()
    );
    eprintln!();

    let store = Arc::new(DirectoryAnswerStore::new(&args.answers));
    let grader = BatchGrader::new(BatchConfig { parallelism, eval });
    let report = grader.run(&package, store, &ConsoleReporter).await?;

    print_summary(&report);

    let output = args.output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "csv" => {
                let path = output.join(format!("scores-{timestamp}.csv"));
                write_csv_report(&report, &path)?;
                eprintln!("CSV scores: {}", path.display());
            }
            _ => eprintln!("Unknown format: {fmt}"),
        }
    }

    Ok(())
}

fn print_summary(report: &GradingReport) {
    let mut table = Table::new();
    table.set_header(vec!["Participant", "Score", "Max", "Percent", "Review"]);

    for s in &report.submissions {
        let r = &s.result;
        table.add_row(vec![
            Cell::new(&s.participant_id),
            Cell::new(r.total_score),
            Cell::new(r.total_max),
            Cell::new(format!("{}%", r.percentage())),
            Cell::new(r.needs_review_count),
        ]);
    }

    eprintln!("\n{table}");

    let stats = &report.aggregate;
    eprintln!(
        "Mean {:.1}% | min {}% | max {}% | {} pending review(s)",
        stats.mean_percentage, stats.min_percentage, stats.max_percentage, stats.pending_reviews
    );
}
