//! ujian CLI: grade exam submissions from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ujian", version, about = "Exam answer evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade every submission in a directory
    Grade {
        /// Path to the package .toml file
        #[arg(long)]
        package: PathBuf,

        /// Directory of <participant>.json submissions
        #[arg(long)]
        answers: PathBuf,

        /// Output format: json, html, csv, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Disable partial credit for MULTI_SELECT questions
        #[arg(long)]
        no_partial_credit: bool,

        /// Penalty per wrongly picked option, as a fraction of max points
        #[arg(long)]
        penalty: Option<f64>,

        /// Max submissions graded concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a single submission file and print every question
    Check {
        /// Path to the package .toml file
        #[arg(long)]
        package: PathBuf,

        /// Submission JSON file
        #[arg(long)]
        submission: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List pending manual reviews, or score one question by hand
    Review {
        /// Grading report JSON (updated in place)
        #[arg(long)]
        report: PathBuf,

        /// Package the report was graded against
        #[arg(long)]
        package: PathBuf,

        /// Participant to score
        #[arg(long, requires_all = ["question", "score"])]
        participant: Option<String>,

        /// Question to score
        #[arg(long, requires = "participant")]
        question: Option<String>,

        /// Manual score (0..=max)
        #[arg(long, requires = "participant", allow_negative_numbers = true)]
        score: Option<f64>,
    },

    /// Compare two grading reports of the same package
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum absolute score change to report
        #[arg(long, default_value = "0.0")]
        threshold: f64,

        /// Exit code 1 if any score changed
        #[arg(long)]
        fail_on_change: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate package TOML files
    Validate {
        /// Path to a package file or directory
        #[arg(long)]
        package: PathBuf,
    },

    /// Create a starter config, package and answers
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ujian=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            package,
            answers,
            format,
            output,
            no_partial_credit,
            penalty,
            parallelism,
            config,
        } => {
            commands::grade::execute(commands::grade::GradeArgs {
                package,
                answers,
                format,
                output,
                no_partial_credit,
                penalty,
                parallelism,
                config,
            })
            .await
        }
        Commands::Check {
            package,
            submission,
            config,
        } => commands::check::execute(package, submission, config),
        Commands::Review {
            report,
            package,
            participant,
            question,
            score,
        } => commands::review::execute(report, package, participant, question, score),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_change,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_change, format),
        Commands::Validate { package } => commands::validate::execute(package),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
