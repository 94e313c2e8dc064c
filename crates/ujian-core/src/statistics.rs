//! Percentages and aggregate statistics over graded submissions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::FEEDBACK_NOT_ANSWERED;
use crate::model::{ExamPackage, QuestionType};
use crate::report::GradedSubmission;

/// Rounded percentage `round(obtained / total * 100)`.
///
/// Returns 0 when `total` is not a positive finite number.
pub fn percentage(obtained: f64, total: f64) -> u32 {
    if !(total.is_finite() && total > 0.0) || !obtained.is_finite() {
        return 0;
    }
    (obtained / total * 100.0).round().max(0.0) as u32
}

/// Aggregate statistics across all graded submissions of a package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of graded submissions.
    pub submission_count: usize,
    /// Mean of the per-submission percentages.
    pub mean_percentage: f64,
    /// Lowest per-submission percentage.
    pub min_percentage: u32,
    /// Highest per-submission percentage.
    pub max_percentage: u32,
    /// Mean total score.
    pub mean_score: f64,
    /// Rows still waiting for manual review, across all submissions.
    pub pending_reviews: usize,
    /// Per-question statistics in package order.
    pub per_question: Vec<QuestionStats>,
}

/// Statistics for a single question across all submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub max: f64,
    /// Mean awarded score.
    pub mean_score: f64,
    /// Fraction of submissions that received full credit.
    pub full_credit_rate: f64,
    /// Submissions where this question still needs review.
    pub review_count: usize,
    /// Submissions where a required answer was left empty.
    pub unanswered_count: usize,
}

/// Compute aggregate statistics from graded submissions.
pub fn compute_aggregate_stats(
    package: &ExamPackage,
    submissions: &[GradedSubmission],
) -> AggregateStats {
    if submissions.is_empty() {
        return AggregateStats {
            per_question: package
                .questions
                .iter()
                .map(|q| QuestionStats {
                    question_id: q.id.clone(),
                    kind: q.kind.clone(),
                    max: q.points,
                    mean_score: 0.0,
                    full_credit_rate: 0.0,
                    review_count: 0,
                    unanswered_count: 0,
                })
                .collect(),
            ..AggregateStats::default()
        };
    }

    let n = submissions.len() as f64;
    let percentages: Vec<u32> = submissions.iter().map(|s| s.result.percentage()).collect();

    let mut per_question_rows: HashMap<&str, Vec<_>> = HashMap::new();
    for s in submissions {
        for row in &s.result.results {
            per_question_rows
                .entry(row.question_id.as_str())
                .or_default()
                .push(row);
        }
    }

    let per_question = package
        .questions
        .iter()
        .map(|q| {
            let rows = per_question_rows
                .get(q.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let count = rows.len().max(1) as f64;
            QuestionStats {
                question_id: q.id.clone(),
                kind: q.kind.clone(),
                max: q.points,
                mean_score: rows.iter().map(|r| r.score).sum::<f64>() / count,
                full_credit_rate: rows
                    .iter()
                    .filter(|r| !r.needs_review && r.max > 0.0 && r.score >= r.max)
                    .count() as f64
                    / count,
                review_count: rows.iter().filter(|r| r.needs_review).count(),
                unanswered_count: rows
                    .iter()
                    .filter(|r| r.feedback.as_deref() == Some(FEEDBACK_NOT_ANSWERED))
                    .count(),
            }
        })
        .collect();

    AggregateStats {
        submission_count: submissions.len(),
        mean_percentage: percentages.iter().map(|&p| p as f64).sum::<f64>() / n,
        min_percentage: percentages.iter().copied().min().unwrap_or(0),
        max_percentage: percentages.iter().copied().max().unwrap_or(0),
        mean_score: submissions.iter().map(|s| s.result.total_score).sum::<f64>() / n,
        pending_reviews: submissions
            .iter()
            .map(|s| s.result.needs_review_count)
            .sum(),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerSheet;
    use crate::config::EvalConfig;
    use crate::engine::evaluate;
    use crate::model::{AnswerOption, Question, QuestionSettings};

    #[test]
    fn percentage_rounds() {
        assert_eq!(percentage(6.0, 10.0), 60);
        assert_eq!(percentage(2.0, 3.0), 67);
        assert_eq!(percentage(1.0, 8.0), 13);
        assert_eq!(percentage(10.0, 10.0), 100);
    }

    #[test]
    fn percentage_of_empty_total_is_zero() {
        assert_eq!(percentage(0.0, 0.0), 0);
        assert_eq!(percentage(3.0, 0.0), 0);
        assert_eq!(percentage(f64::NAN, 10.0), 0);
    }

    fn package() -> ExamPackage {
        ExamPackage {
            id: "p".into(),
            name: "P".into(),
            description: String::new(),
            duration_minutes: None,
            evaluation: None,
            questions: vec![
                Question {
                    id: "q1".into(),
                    kind: QuestionType::SingleChoice,
                    text: String::new(),
                    points: 2.0,
                    required: true,
                    options: vec![
                        AnswerOption {
                            id: "a".into(),
                            label: "A".into(),
                            text: String::new(),
                            is_correct: true,
                        },
                        AnswerOption {
                            id: "b".into(),
                            label: "B".into(),
                            text: String::new(),
                            is_correct: false,
                        },
                    ],
                    settings: QuestionSettings::default(),
                },
                Question {
                    id: "q2".into(),
                    kind: QuestionType::Essay,
                    text: String::new(),
                    points: 3.0,
                    required: false,
                    options: vec![],
                    settings: QuestionSettings::default(),
                },
            ],
        }
    }

    fn graded(package: &ExamPackage, participant: &str, q1: &str) -> GradedSubmission {
        let mut answers = AnswerSheet::new();
        answers.insert("q1".into(), q1.into());
        answers.insert("q2".into(), "esai".into());
        GradedSubmission {
            participant_id: participant.into(),
            submitted_at: None,
            result: evaluate(&package.questions, &answers, &EvalConfig::default()),
        }
    }

    #[test]
    fn aggregate_over_submissions() {
        let package = package();
        let submissions = vec![
            graded(&package, "p1", "A"),
            graded(&package, "p2", "B"),
            graded(&package, "p3", ""),
        ];
        let stats = compute_aggregate_stats(&package, &submissions);

        assert_eq!(stats.submission_count, 3);
        assert_eq!(stats.max_percentage, 40);
        assert_eq!(stats.min_percentage, 0);
        assert_eq!(stats.pending_reviews, 3);
        assert!((stats.mean_score - 2.0 / 3.0).abs() < 1e-12);

        let q1 = &stats.per_question[0];
        assert_eq!(q1.question_id, "q1");
        assert!((q1.full_credit_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(q1.unanswered_count, 1);

        let q2 = &stats.per_question[1];
        assert_eq!(q2.review_count, 3);
        assert_eq!(q2.full_credit_rate, 0.0);
    }

    #[test]
    fn aggregate_of_nothing() {
        let package = package();
        let stats = compute_aggregate_stats(&package, &[]);
        assert_eq!(stats.submission_count, 0);
        assert_eq!(stats.per_question.len(), 2);
        assert_eq!(stats.mean_percentage, 0.0);
    }
}
