//! Grading report types with JSON persistence, manual review and regrade comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EvalConfig;
use crate::error::ReviewError;
use crate::model::{ExamPackage, QuestionType};
use crate::results::SubmissionResult;
use crate::statistics::{compute_aggregate_stats, AggregateStats};

/// A complete grading report for one package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded package.
    pub package: PackageSummary,
    /// Evaluation policy the submissions were graded with.
    pub config: EvalConfig,
    /// Graded submissions, sorted by participant id.
    pub submissions: Vec<GradedSubmission>,
    /// Submissions that could not be loaded.
    #[serde(default)]
    pub failures: Vec<SubmissionFailure>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a package (without the question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
    pub total_points: f64,
}

impl From<&ExamPackage> for PackageSummary {
    fn from(package: &ExamPackage) -> Self {
        Self {
            id: package.id.clone(),
            name: package.name.clone(),
            question_count: package.questions.len(),
            total_points: package.total_points(),
        }
    }
}

/// One participant's graded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSubmission {
    pub participant_id: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    pub result: SubmissionResult,
}

/// A submission that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailure {
    pub participant_id: String,
    pub error: String,
}

/// A question that still needs a human score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub participant_id: String,
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl GradingReport {
    /// Assemble a report, computing aggregate statistics.
    pub fn new(
        package: &ExamPackage,
        config: EvalConfig,
        mut submissions: Vec<GradedSubmission>,
        mut failures: Vec<SubmissionFailure>,
        duration_ms: u64,
    ) -> Self {
        submissions.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        failures.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        let aggregate = compute_aggregate_stats(package, &submissions);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            package: PackageSummary::from(package),
            config,
            submissions,
            failures,
            aggregate,
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Find a participant's graded submission.
    pub fn submission(&self, participant_id: &str) -> Option<&GradedSubmission> {
        self.submissions
            .iter()
            .find(|s| s.participant_id == participant_id)
    }

    /// Every (participant, question) pair still waiting for manual review.
    pub fn review_queue(&self) -> Vec<ReviewItem> {
        self.submissions
            .iter()
            .flat_map(|s| {
                s.result
                    .results
                    .iter()
                    .filter(|r| r.needs_review)
                    .map(move |r| ReviewItem {
                        participant_id: s.participant_id.clone(),
                        question_id: r.question_id.clone(),
                        kind: r.kind.clone(),
                        max: r.max,
                        feedback: r.feedback.clone(),
                    })
            })
            .collect()
    }

    /// Assign a manual score to one participant's question and refresh the
    /// aggregate statistics.
    pub fn apply_manual_score(
        &mut self,
        package: &ExamPackage,
        participant_id: &str,
        question_id: &str,
        score: f64,
    ) -> Result<(), ReviewError> {
        let submission = self
            .submissions
            .iter_mut()
            .find(|s| s.participant_id == participant_id)
            .ok_or_else(|| ReviewError::UnknownParticipant(participant_id.to_string()))?;

        submission.result = submission.result.with_manual_score(question_id, score)?;
        self.aggregate = compute_aggregate_stats(package, &self.submissions);
        Ok(())
    }

    /// Compare this report against a baseline, e.g. after correcting an
    /// answer key and grading again.
    ///
    /// Changes whose absolute score delta does not exceed `threshold` count
    /// as unchanged.
    pub fn compare(&self, baseline: &GradingReport, threshold: f64) -> RegradeReport {
        let score_map = |report: &GradingReport| -> HashMap<String, (f64, f64)> {
            report
                .submissions
                .iter()
                .map(|s| {
                    (
                        s.participant_id.clone(),
                        (s.result.total_score, s.result.total_max),
                    )
                })
                .collect()
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut lowered = Vec::new();
        let mut raised = Vec::new();
        let mut unchanged = 0usize;
        let mut new_participants = 0usize;

        for (participant, &(current, current_max)) in &current_scores {
            let Some(&(before, before_max)) = baseline_scores.get(participant) else {
                new_participants += 1;
                continue;
            };
            let delta = current - before;
            let change = ScoreChange {
                participant_id: participant.clone(),
                baseline_score: before,
                current_score: current,
                baseline_percentage: crate::statistics::percentage(before, before_max),
                current_percentage: crate::statistics::percentage(current, current_max),
                delta,
            };
            if delta < -threshold {
                lowered.push(change);
            } else if delta > threshold {
                raised.push(change);
            } else {
                unchanged += 1;
            }
        }

        lowered.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        raised.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));

        let removed_participants = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        RegradeReport {
            lowered,
            raised,
            unchanged,
            new_participants,
            removed_participants,
        }
    }
}

/// Result of comparing two grading reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegradeReport {
    /// Participants whose score went down.
    pub lowered: Vec<ScoreChange>,
    /// Participants whose score went up.
    pub raised: Vec<ScoreChange>,
    /// Participants with no significant change.
    pub unchanged: usize,
    /// Participants in current but not baseline.
    pub new_participants: usize,
    /// Participants in baseline but not current.
    pub removed_participants: usize,
}

/// A participant's score before and after regrading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChange {
    pub participant_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub baseline_percentage: u32,
    pub current_percentage: u32,
    pub delta: f64,
}

impl RegradeReport {
    /// Format the regrade report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} lowered, {} raised, {} unchanged\n\n",
            self.lowered.len(),
            self.raised.len(),
            self.unchanged
        ));

        for (title, changes) in [("Lowered", &self.lowered), ("Raised", &self.raised)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Participant | Baseline | Current | Delta |\n");
            md.push_str("|-------------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} ({}%) | {} ({}%) | {:+} |\n",
                    c.participant_id,
                    c.baseline_score,
                    c.baseline_percentage,
                    c.current_score,
                    c.current_percentage,
                    c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any participant's score changed.
    pub fn has_changes(&self) -> bool {
        !self.lowered.is_empty() || !self.raised.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::PerQuestionResult;

    fn package() -> ExamPackage {
        crate::parser::parse_package_str(
            r#"
[package]
id = "uts"
name = "UTS"

[[questions]]
id = "q1"
type = "SINGLE_CHOICE"
points = 2

[[questions.options]]
id = "a"
label = "A"
is_correct = true

[[questions]]
id = "q2"
type = "ESSAY"
points = 4
"#,
            Path::new("uts.toml"),
        )
        .unwrap()
    }

    fn graded(participant: &str, q1_score: f64) -> GradedSubmission {
        GradedSubmission {
            participant_id: participant.into(),
            submitted_at: None,
            result: SubmissionResult::from_rows(vec![
                PerQuestionResult {
                    question_id: "q1".into(),
                    kind: QuestionType::SingleChoice,
                    max: 2.0,
                    score: q1_score,
                    needs_review: false,
                    correct: Some(q1_score == 2.0),
                    feedback: None,
                },
                PerQuestionResult {
                    question_id: "q2".into(),
                    kind: QuestionType::Essay,
                    max: 4.0,
                    score: 0.0,
                    needs_review: true,
                    correct: None,
                    feedback: None,
                },
            ]),
        }
    }

    fn make_report(submissions: Vec<GradedSubmission>) -> GradingReport {
        GradingReport::new(&package(), EvalConfig::default(), submissions, vec![], 0)
    }

    #[test]
    fn submissions_are_sorted() {
        let report = make_report(vec![graded("zed", 2.0), graded("amir", 0.0)]);
        assert_eq!(report.submissions[0].participant_id, "amir");
        assert_eq!(report.package.question_count, 2);
        assert_eq!(report.package.total_points, 6.0);
    }

    #[test]
    fn review_queue_lists_pending_rows() {
        let report = make_report(vec![graded("p1", 2.0), graded("p2", 0.0)]);
        let queue = report.review_queue();
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|item| item.question_id == "q2"));
        assert_eq!(queue[0].participant_id, "p1");
    }

    #[test]
    fn manual_score_updates_aggregate() {
        let package = package();
        let mut report = make_report(vec![graded("p1", 2.0)]);
        assert_eq!(report.aggregate.pending_reviews, 1);

        report.apply_manual_score(&package, "p1", "q2", 3.0).unwrap();
        let p1 = report.submission("p1").unwrap();
        assert_eq!(p1.result.total_score, 5.0);
        assert_eq!(report.aggregate.pending_reviews, 0);
        assert!(report.review_queue().is_empty());

        assert!(matches!(
            report.apply_manual_score(&package, "ghost", "q2", 1.0),
            Err(ReviewError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report(vec![graded("p1", 2.0)]);
        let current = make_report(vec![graded("p1", 2.0)]);
        let regrade = current.compare(&baseline, 0.0);
        assert!(!regrade.has_changes());
        assert_eq!(regrade.unchanged, 1);
    }

    #[test]
    fn compare_after_key_correction() {
        let baseline = make_report(vec![graded("p1", 0.0), graded("p2", 2.0)]);
        let current = make_report(vec![graded("p1", 2.0), graded("p2", 0.0)]);
        let regrade = current.compare(&baseline, 0.0);
        assert_eq!(regrade.raised.len(), 1);
        assert_eq!(regrade.raised[0].participant_id, "p1");
        assert_eq!(regrade.raised[0].current_percentage, 33);
        assert_eq!(regrade.lowered.len(), 1);
        assert_eq!(regrade.lowered[0].participant_id, "p2");
        assert!(regrade.lowered[0].delta < 0.0);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report(vec![graded("old", 2.0)]);
        let current = make_report(vec![graded("new", 2.0)]);
        let regrade = current.compare(&baseline, 0.0);
        assert_eq!(regrade.new_participants, 1);
        assert_eq!(regrade.removed_participants, 1);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![graded("p1", 2.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = GradingReport::load_json(&path).unwrap();

        assert_eq!(loaded.package.id, "uts");
        assert_eq!(loaded.submissions.len(), 1);
        assert_eq!(loaded.submissions[0].result, report.submissions[0].result);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(vec![graded("p1", 2.0)]);
        let current = make_report(vec![graded("p1", 0.0)]);
        let md = current.compare(&baseline, 0.0).to_markdown();
        assert!(md.contains("Lowered"));
        assert!(md.contains("p1"));
        assert!(md.contains("-2"));
    }
}
