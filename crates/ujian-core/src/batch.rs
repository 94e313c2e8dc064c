//! Batch grading orchestrator.
//!
//! Loads every submission from an [`AnswerStore`], evaluates it against a
//! package with bounded concurrency, and assembles a [`GradingReport`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::config::EvalConfig;
use crate::engine::evaluate;
use crate::model::ExamPackage;
use crate::report::{GradedSubmission, GradingReport, SubmissionFailure};
use crate::traits::AnswerStore;

/// Configuration for the batch grader.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum submissions loaded concurrently.
    pub parallelism: usize,
    /// Evaluation policy applied to every submission.
    pub eval: EvalConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            eval: EvalConfig::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_submission_start(&self, participant_id: &str);
    fn on_submission_graded(&self, graded: &GradedSubmission);
    fn on_submission_error(&self, participant_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_submission_start(&self, _: &str) {}
    fn on_submission_graded(&self, _: &GradedSubmission) {}
    fn on_submission_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grades all submissions of a package.
pub struct BatchGrader {
    config: BatchConfig,
}

impl BatchGrader {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Grade every participant found in `store`.
    ///
    /// A submission that fails to load is recorded in the report's failures
    /// and does not abort the batch.
    pub async fn run(
        &self,
        package: &ExamPackage,
        store: Arc<dyn AnswerStore>,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let participants = store.list_participants().await?;
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let questions = Arc::new(package.questions.clone());
        let eval = self.config.eval;

        let mut futures = FuturesUnordered::new();

        for participant in participants {
            let store = Arc::clone(&store);
            let semaphore = Arc::clone(&semaphore);
            let questions = Arc::clone(&questions);
            progress.on_submission_start(&participant);

            futures.push(async move {
                let inner = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let submission = store.load_submission(&participant).await?;
                    let result = evaluate(&questions, &submission.answers, &eval);
                    // The submission's own id wins over the store's listing key.
                    let participant_id = if submission.participant_id.is_empty() {
                        participant.clone()
                    } else {
                        submission.participant_id
                    };
                    anyhow::Ok(GradedSubmission {
                        participant_id,
                        submitted_at: submission.submitted_at,
                        result,
                    })
                };
                let outcome = inner.await;
                (participant, outcome)
            });
        }

        let total = futures.len();
        let mut submissions = Vec::with_capacity(total);
        let mut failures = Vec::new();

        while let Some((participant, outcome)) = futures.next().await {
            match outcome {
                Ok(graded) => {
                    tracing::debug!(
                        participant = %graded.participant_id,
                        score = graded.result.total_score,
                        max = graded.result.total_max,
                        needs_review = graded.result.needs_review_count,
                        "submission graded"
                    );
                    progress.on_submission_graded(&graded);
                    submissions.push(graded);
                }
                Err(e) => {
                    tracing::error!("failed to grade submission {participant}: {e:#}");
                    progress.on_submission_error(&participant, &e.to_string());
                    failures.push(SubmissionFailure {
                        participant_id: participant,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, submissions.len(), failures.len(), elapsed);

        Ok(GradingReport::new(
            package,
            eval,
            submissions,
            failures,
            elapsed.as_millis() as u64,
        ))
    }
}
