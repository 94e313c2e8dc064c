//! The answer evaluation engine.
//!
//! [`evaluate`] is a pure function: it takes the ordered questions of a
//! package, one participant's raw answers, and the evaluation policy, and
//! returns a scored [`SubmissionResult`]. It never fails and never panics;
//! anything it cannot grade automatically is flagged for manual review.

use std::collections::HashSet;

use crate::answer::{resolve_option, AnswerSheet, RawAnswer};
use crate::config::EvalConfig;
use crate::model::{Question, QuestionType};
use crate::results::{PerQuestionResult, SubmissionResult};

/// Feedback for a required question left empty.
pub const FEEDBACK_NOT_ANSWERED: &str = "Tidak dijawab";
/// Feedback for a `NUMBER` question without a numeric target.
pub const FEEDBACK_MISSING_TARGET: &str = "Target jawaban belum diatur";
/// Feedback for a question type the engine does not know.
pub const FEEDBACK_UNKNOWN_TYPE: &str = "Tipe soal tidak dikenal";

/// Evaluate one submission.
///
/// Rows in the result follow the order of `questions`. Answers missing from
/// `answers` are treated as `null`.
pub fn evaluate(
    questions: &[Question],
    answers: &AnswerSheet,
    config: &EvalConfig,
) -> SubmissionResult {
    let rows = questions
        .iter()
        .map(|q| {
            let answer = answers.get(&q.id).unwrap_or(&RawAnswer::Null);
            evaluate_question(q, answer, config)
        })
        .collect();

    SubmissionResult::from_rows(rows)
}

/// Evaluate a single question against a raw answer.
pub fn evaluate_question(
    question: &Question,
    answer: &RawAnswer,
    config: &EvalConfig,
) -> PerQuestionResult {
    let max = question.points;

    if question.required && answer.is_blank() {
        return Grade::wrong()
            .with_feedback(FEEDBACK_NOT_ANSWERED)
            .into_row(question);
    }

    let grade = match &question.kind {
        QuestionType::SingleChoice => grade_single_choice(question, answer, max),
        QuestionType::MultiSelect => grade_multi_select(question, answer, max, config),
        QuestionType::TrueFalse => grade_true_false(question, answer, max),
        QuestionType::Number => grade_number(question, answer, max),
        QuestionType::Range | QuestionType::ShortText | QuestionType::Essay => Grade::review(),
        QuestionType::Other(_) => Grade::review().with_feedback(FEEDBACK_UNKNOWN_TYPE),
    };

    grade.into_row(question)
}

/// Saturating clamp. `NaN` saturates to `lo`; never panics, even if `lo > hi`.
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() {
        return lo;
    }
    v.max(lo).min(hi)
}

/// Intermediate outcome of a type-specific grader.
struct Grade {
    score: f64,
    needs_review: bool,
    correct: Option<bool>,
    feedback: Option<&'static str>,
}

impl Grade {
    fn verdict(correct: bool, max: f64) -> Self {
        Self {
            score: if correct { max } else { 0.0 },
            needs_review: false,
            correct: Some(correct),
            feedback: None,
        }
    }

    fn wrong() -> Self {
        Self::verdict(false, 0.0)
    }

    fn review() -> Self {
        Self {
            score: 0.0,
            needs_review: true,
            correct: None,
            feedback: None,
        }
    }

    fn with_feedback(mut self, feedback: &'static str) -> Self {
        self.feedback = Some(feedback);
        self
    }

    fn into_row(self, question: &Question) -> PerQuestionResult {
        let max = question.points;
        PerQuestionResult {
            question_id: question.id.clone(),
            kind: question.kind.clone(),
            max,
            score: clamp(self.score, 0.0, max),
            needs_review: self.needs_review,
            correct: self.correct,
            feedback: self.feedback.map(str::to_string),
        }
    }
}

fn grade_single_choice(question: &Question, answer: &RawAnswer, max: f64) -> Grade {
    let picked = answer
        .as_text()
        .and_then(|token| resolve_option(&question.options, token));
    let key = question.key_option();

    let correct = match (picked, key) {
        (Some(p), Some(k)) => p.label == k.label,
        _ => false,
    };
    Grade::verdict(correct, max)
}

fn grade_multi_select(
    question: &Question,
    answer: &RawAnswer,
    max: f64,
    config: &EvalConfig,
) -> Grade {
    let picked: HashSet<&str> = answer
        .tokens()
        .into_iter()
        .filter_map(|token| resolve_option(&question.options, token))
        .map(|o| o.id.as_str())
        .collect();

    let correct_ids: HashSet<&str> = question
        .options
        .iter()
        .filter(|o| o.is_correct)
        .map(|o| o.id.as_str())
        .collect();

    let true_pos = picked.iter().filter(|id| correct_ids.contains(*id)).count();
    let false_pos = picked.len() - true_pos;

    // Exact set equality.
    let all_match =
        true_pos == correct_ids.len() && false_pos == 0 && picked.len() == correct_ids.len();

    let score = if config.allow_partial_credit && !correct_ids.is_empty() {
        let earned = (true_pos as f64 / correct_ids.len() as f64) * max;
        let penalty = config.wrong_pick_penalty_per_option * false_pos as f64 * max;
        clamp(earned - penalty, 0.0, max)
    } else if all_match {
        max
    } else {
        0.0
    };

    Grade {
        score,
        needs_review: false,
        correct: Some(all_match),
        feedback: None,
    }
}

fn is_label_a(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case("A")
}

fn grade_true_false(question: &Question, answer: &RawAnswer, max: f64) -> Grade {
    let key = question
        .options
        .iter()
        .any(|o| o.is_correct && is_label_a(&o.label))
        || question
            .key_option()
            .is_some_and(|o| o.text.trim().eq_ignore_ascii_case("TRUE"));

    let given = match answer {
        RawAnswer::Bool(b) => Some(*b),
        RawAnswer::Text(s) if s.eq_ignore_ascii_case("TRUE") => Some(true),
        RawAnswer::Text(s) if s.eq_ignore_ascii_case("FALSE") => Some(false),
        RawAnswer::Text(s) => Some(
            resolve_option(&question.options, s).is_some_and(|o| is_label_a(&o.label)),
        ),
        _ => None,
    };

    Grade::verdict(given == Some(key), max)
}

fn grade_number(question: &Question, answer: &RawAnswer, max: f64) -> Grade {
    let Some(target) = question.settings.target.filter(|t| t.is_finite()) else {
        return Grade::review().with_feedback(FEEDBACK_MISSING_TARGET);
    };
    // f64::max ignores NaN, so a NaN tolerance falls back to exact match.
    let tolerance = question.settings.tolerance.unwrap_or(0.0).max(0.0);
    let value = answer.as_number();

    Grade::verdict((value - target).abs() <= tolerance, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, QuestionSettings};

    fn option(id: &str, label: &str, text: &str, is_correct: bool) -> AnswerOption {
        AnswerOption {
            id: id.into(),
            label: label.into(),
            text: text.into(),
            is_correct,
        }
    }

    fn question(id: &str, kind: QuestionType, points: f64, options: Vec<AnswerOption>) -> Question {
        Question {
            id: id.into(),
            kind,
            text: String::new(),
            points,
            required: false,
            options,
            settings: QuestionSettings::default(),
        }
    }

    fn abcd(correct: &[&str]) -> Vec<AnswerOption> {
        ["A", "B", "C", "D"]
            .iter()
            .map(|l| {
                let id = format!("opt-{}", l.to_lowercase());
                option(&id, l, &format!("Pilihan {l}"), correct.contains(l))
            })
            .collect()
    }

    fn number(target: Option<f64>, tolerance: Option<f64>) -> Question {
        let mut q = question("n1", QuestionType::Number, 3.0, vec![]);
        q.settings.target = target;
        q.settings.tolerance = tolerance;
        q
    }

    fn eval_one(q: &Question, answer: RawAnswer) -> PerQuestionResult {
        evaluate_question(q, &answer, &EvalConfig::default())
    }

    #[test]
    fn required_empty_short_circuits_every_type() {
        let kinds = [
            QuestionType::SingleChoice,
            QuestionType::MultiSelect,
            QuestionType::TrueFalse,
            QuestionType::ShortText,
            QuestionType::Essay,
            QuestionType::Number,
            QuestionType::Range,
            QuestionType::Other("MATCHING".into()),
        ];
        let blanks = [
            RawAnswer::Null,
            RawAnswer::List(vec![]),
            RawAnswer::from(""),
            RawAnswer::from("  "),
        ];
        for kind in &kinds {
            let mut q = question("q", kind.clone(), 5.0, abcd(&["A"]));
            q.required = true;
            for blank in &blanks {
                let r = eval_one(&q, blank.clone());
                assert_eq!(r.score, 0.0, "{kind} / {blank:?}");
                assert!(!r.needs_review, "{kind} / {blank:?}");
                assert_eq!(r.correct, Some(false));
                assert_eq!(r.feedback.as_deref(), Some(FEEDBACK_NOT_ANSWERED));
            }
        }
    }

    #[test]
    fn optional_empty_essay_still_needs_review() {
        let q = question("e", QuestionType::Essay, 4.0, vec![]);
        let r = eval_one(&q, RawAnswer::Null);
        assert!(r.needs_review);
        assert_eq!(r.feedback, None);
    }

    #[test]
    fn single_choice_by_id_and_label() {
        let q = question("s", QuestionType::SingleChoice, 2.0, abcd(&["C"]));

        let by_id = eval_one(&q, "opt-c".into());
        assert_eq!(by_id.score, 2.0);
        assert_eq!(by_id.correct, Some(true));

        for label in ["C", "c"] {
            let r = eval_one(&q, label.into());
            assert_eq!(r, by_id);
        }

        let wrong = eval_one(&q, "opt-a".into());
        assert_eq!(wrong.score, 0.0);
        assert_eq!(wrong.correct, Some(false));

        let unrelated = eval_one(&q, "Jakarta".into());
        assert_eq!(unrelated.score, 0.0);
        assert_eq!(unrelated.correct, Some(false));
        assert!(!unrelated.needs_review);
    }

    #[test]
    fn single_choice_ignores_non_string_answers() {
        let q = question("s", QuestionType::SingleChoice, 2.0, abcd(&["A"]));
        for answer in [
            RawAnswer::Bool(true),
            RawAnswer::Number(0.0),
            RawAnswer::from(vec!["A"]),
        ] {
            let r = eval_one(&q, answer);
            assert_eq!(r.score, 0.0);
            assert_eq!(r.correct, Some(false));
        }
    }

    #[test]
    fn single_choice_without_key_is_never_correct() {
        let q = question("s", QuestionType::SingleChoice, 2.0, abcd(&[]));
        let r = eval_one(&q, "A".into());
        assert_eq!(r.score, 0.0);
        assert_eq!(r.correct, Some(false));
    }

    #[test]
    fn multi_select_exact_match_without_partial_credit() {
        let q = question("m", QuestionType::MultiSelect, 4.0, abcd(&["A", "C"]));
        let config = EvalConfig {
            allow_partial_credit: false,
            wrong_pick_penalty_per_option: 0.0,
        };

        let exact = evaluate_question(&q, &vec!["opt-a", "C"].into(), &config);
        assert_eq!(exact.score, 4.0);
        assert_eq!(exact.correct, Some(true));

        for deviation in [vec!["A"], vec!["A", "B", "C"], vec!["B", "D"]] {
            let r = evaluate_question(&q, &deviation.into(), &config);
            assert_eq!(r.score, 0.0);
            assert_eq!(r.correct, Some(false));
        }
    }

    #[test]
    fn multi_select_partial_credit_with_penalty() {
        let q = question("m", QuestionType::MultiSelect, 4.0, abcd(&["A", "C"]));
        let config = EvalConfig {
            allow_partial_credit: true,
            wrong_pick_penalty_per_option: 0.25,
        };
        let r = evaluate_question(&q, &vec!["A", "B"].into(), &config);
        assert!((r.score - 0.25 * 4.0).abs() < 1e-12, "got {}", r.score);
        assert_eq!(r.correct, Some(false));
    }

    #[test]
    fn multi_select_penalty_saturates_at_zero() {
        let q = question("m", QuestionType::MultiSelect, 4.0, abcd(&["A"]));
        let config = EvalConfig {
            allow_partial_credit: true,
            wrong_pick_penalty_per_option: 1.0,
        };
        let r = evaluate_question(&q, &vec!["B", "C", "D"].into(), &config);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn multi_select_single_string_and_duplicates() {
        let q = question("m", QuestionType::MultiSelect, 2.0, abcd(&["B"]));
        assert_eq!(eval_one(&q, "B".into()).correct, Some(true));

        // "opt-b" and "b" resolve to the same option.
        let r = eval_one(&q, vec!["opt-b", "b", "nonsense"].into());
        assert_eq!(r.score, 2.0);
        assert_eq!(r.correct, Some(true));
    }

    #[test]
    fn true_false_label_key() {
        let q = question(
            "t",
            QuestionType::TrueFalse,
            1.0,
            vec![
                option("tf-a", "A", "Benar", true),
                option("tf-b", "B", "Salah", false),
            ],
        );
        assert_eq!(eval_one(&q, RawAnswer::Bool(true)).score, 1.0);
        assert_eq!(eval_one(&q, "TRUE".into()).score, 1.0);
        assert_eq!(eval_one(&q, "true".into()).score, 1.0);
        assert_eq!(eval_one(&q, "A".into()).score, 1.0);
        assert_eq!(eval_one(&q, "tf-a".into()).score, 1.0);
        assert_eq!(eval_one(&q, RawAnswer::Bool(false)).score, 0.0);
        assert_eq!(eval_one(&q, "B".into()).correct, Some(false));
    }

    #[test]
    fn true_false_text_key() {
        // Key stored as option text rather than as label A.
        let q = question(
            "t",
            QuestionType::TrueFalse,
            1.0,
            vec![
                option("x", "B", "TRUE", true),
                option("y", "C", "FALSE", false),
            ],
        );
        assert_eq!(eval_one(&q, "TRUE".into()).score, 1.0);
        assert_eq!(eval_one(&q, RawAnswer::Bool(true)).score, 1.0);
        assert_eq!(eval_one(&q, "FALSE".into()).score, 0.0);
    }

    #[test]
    fn true_false_key_false_and_unresolved_strings() {
        let q = question(
            "t",
            QuestionType::TrueFalse,
            1.0,
            vec![
                option("a", "A", "Benar", false),
                option("b", "B", "Salah", true),
            ],
        );
        assert_eq!(eval_one(&q, "FALSE".into()).score, 1.0);
        assert_eq!(eval_one(&q, "B".into()).score, 1.0);
        // Unresolved strings count as "false".
        assert_eq!(eval_one(&q, "mungkin".into()).score, 1.0);
        // Shapes that are neither string nor boolean never match.
        assert_eq!(eval_one(&q, RawAnswer::Number(0.0)).score, 0.0);
    }

    #[test]
    fn number_within_tolerance() {
        let q = number(Some(10.0), Some(0.5));
        for ok in [9.5, 10.0, 10.5] {
            let r = eval_one(&q, RawAnswer::Number(ok));
            assert_eq!(r.correct, Some(true), "{ok}");
            assert_eq!(r.score, 3.0);
        }
        for bad in [9.49, 11.0] {
            let r = eval_one(&q, RawAnswer::Number(bad));
            assert_eq!(r.correct, Some(false), "{bad}");
            assert_eq!(r.score, 0.0);
        }
        assert_eq!(eval_one(&q, "10.25".into()).correct, Some(true));
        assert_eq!(eval_one(&q, "sepuluh".into()).correct, Some(false));
    }

    #[test]
    fn number_tolerance_defaults_to_exact_and_ignores_negative() {
        let exact = number(Some(7.0), None);
        assert_eq!(eval_one(&exact, RawAnswer::Number(7.0)).correct, Some(true));
        assert_eq!(eval_one(&exact, RawAnswer::Number(7.001)).correct, Some(false));

        let negative = number(Some(7.0), Some(-3.0));
        assert_eq!(eval_one(&negative, RawAnswer::Number(7.0)).correct, Some(true));
        assert_eq!(eval_one(&negative, RawAnswer::Number(6.0)).correct, Some(false));
    }

    #[test]
    fn number_without_target_needs_review() {
        let q = number(None, Some(1.0));
        let r = eval_one(&q, RawAnswer::Number(10.0));
        assert!(r.needs_review);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.correct, None);
        assert_eq!(r.feedback.as_deref(), Some(FEEDBACK_MISSING_TARGET));
    }

    #[test]
    fn manual_types_always_need_review() {
        for kind in [QuestionType::Range, QuestionType::ShortText, QuestionType::Essay] {
            let q = question("x", kind.clone(), 5.0, vec![]);
            for answer in [
                RawAnswer::from("jawaban panjang"),
                RawAnswer::Number(42.0),
                RawAnswer::Bool(true),
            ] {
                let r = eval_one(&q, answer);
                assert_eq!(r.score, 0.0, "{kind}");
                assert!(r.needs_review, "{kind}");
                assert_eq!(r.correct, None);
            }
        }
    }

    #[test]
    fn unknown_type_needs_review_with_feedback() {
        let q = question("x", QuestionType::Other("MATCHING".into()), 2.0, vec![]);
        let r = eval_one(&q, "anything".into());
        assert!(r.needs_review);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.feedback.as_deref(), Some(FEEDBACK_UNKNOWN_TYPE));
        assert_eq!(r.kind, QuestionType::Other("MATCHING".into()));
    }

    #[test]
    fn end_to_end_three_questions() {
        let questions = vec![
            question("q1", QuestionType::SingleChoice, 2.0, abcd(&["B"])),
            question("q2", QuestionType::MultiSelect, 4.0, abcd(&["A", "D"])),
            question("q3", QuestionType::Essay, 4.0, vec![]),
        ];
        let mut answers = AnswerSheet::new();
        answers.insert("q1".into(), "B".into());
        answers.insert("q2".into(), vec!["A", "D"].into());
        answers.insert("q3".into(), "Fotosintesis adalah ...".into());

        let result = evaluate(&questions, &answers, &EvalConfig::default());
        assert_eq!(result.total_score, 6.0);
        assert_eq!(result.total_max, 10.0);
        assert_eq!(result.needs_review_count, 1);
        let ids: Vec<&str> = result.results.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        let result = evaluate(&[], &AnswerSheet::new(), &EvalConfig::default());
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.total_max, 0.0);
        assert_eq!(result.needs_review_count, 0);
        assert!(result.results.is_empty());
    }

    #[test]
    fn clamp_saturates() {
        assert_eq!(clamp(5.0, 0.0, 2.0), 2.0);
        assert_eq!(clamp(-1.0, 0.0, 2.0), 0.0);
        assert_eq!(clamp(f64::NAN, 0.0, 2.0), 0.0);
        assert_eq!(clamp(f64::INFINITY, 0.0, 2.0), 2.0);
    }
}
