//! Evaluation output types and manual score overrides.

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::model::QuestionType;

/// One row of evaluation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerQuestionResult {
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Copied from the question's `points`.
    pub max: f64,
    /// Always within `0..=max`.
    pub score: f64,
    /// No automatic key exists; a human has to assign the score.
    pub needs_review: bool,
    /// Present only when a binary verdict is meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    /// Diagnostic text (e.g. "Tidak dijawab").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Aggregate result for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub total_score: f64,
    pub total_max: f64,
    pub needs_review_count: usize,
    /// Per-question rows in the same order as the input questions.
    pub results: Vec<PerQuestionResult>,
}

impl SubmissionResult {
    /// Build an aggregate from per-question rows.
    pub fn from_rows(results: Vec<PerQuestionResult>) -> Self {
        let total_score = results.iter().map(|r| r.score).sum();
        let total_max = results.iter().map(|r| r.max).sum();
        let needs_review_count = results.iter().filter(|r| r.needs_review).count();
        Self {
            total_score,
            total_max,
            needs_review_count,
            results,
        }
    }

    /// Look up the row for a question.
    pub fn get(&self, question_id: &str) -> Option<&PerQuestionResult> {
        self.results.iter().find(|r| r.question_id == question_id)
    }

    /// Rounded percentage of `total_score` over `total_max`.
    pub fn percentage(&self) -> u32 {
        crate::statistics::percentage(self.total_score, self.total_max)
    }

    /// Return a copy with a manually assigned score for one question.
    ///
    /// The row stops needing review, its automatic verdict is dropped and the
    /// totals are recomputed. The engine is not re-run.
    pub fn with_manual_score(&self, question_id: &str, score: f64) -> Result<Self, ReviewError> {
        let row = self
            .get(question_id)
            .ok_or_else(|| ReviewError::UnknownQuestion(question_id.to_string()))?;

        if !score.is_finite() || score < 0.0 || score > row.max {
            return Err(ReviewError::ScoreOutOfRange {
                question_id: question_id.to_string(),
                score,
                max: row.max,
            });
        }

        let rows = self
            .results
            .iter()
            .map(|r| {
                if r.question_id == question_id {
                    PerQuestionResult {
                        score,
                        needs_review: false,
                        correct: None,
                        feedback: None,
                        ..r.clone()
                    }
                } else {
                    r.clone()
                }
            })
            .collect();

        Ok(Self::from_rows(rows))
    }
}
