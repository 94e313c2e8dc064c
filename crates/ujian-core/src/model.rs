//! Core data model types for ujian.
//!
//! These are the types that describe an exam package: its questions, their
//! answer options, and the type-specific grading settings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EvalConfig;

/// The declared type of a question.
///
/// Unknown type strings are preserved in [`QuestionType::Other`] instead of
/// failing to parse, so catalogs written for newer versions still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    SingleChoice,
    MultiSelect,
    TrueFalse,
    ShortText,
    Essay,
    Number,
    Range,
    Other(String),
}

impl QuestionType {
    /// The canonical wire name (e.g. `SINGLE_CHOICE`).
    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultiSelect => "MULTI_SELECT",
            QuestionType::TrueFalse => "TRUE_FALSE",
            QuestionType::ShortText => "SHORT_TEXT",
            QuestionType::Essay => "ESSAY",
            QuestionType::Number => "NUMBER",
            QuestionType::Range => "RANGE",
            QuestionType::Other(name) => name,
        }
    }

    /// Whether answers to this type are picked from `options`.
    pub fn uses_options(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultiSelect | QuestionType::TrueFalse
        )
    }
}

impl From<&str> for QuestionType {
    fn from(s: &str) -> Self {
        match s {
            "SINGLE_CHOICE" => QuestionType::SingleChoice,
            "MULTI_SELECT" => QuestionType::MultiSelect,
            "TRUE_FALSE" => QuestionType::TrueFalse,
            "SHORT_TEXT" => QuestionType::ShortText,
            "ESSAY" => QuestionType::Essay,
            "NUMBER" => QuestionType::Number,
            "RANGE" => QuestionType::Range,
            _ => QuestionType::Other(s.to_string()),
        }
    }
}

impl From<String> for QuestionType {
    fn from(s: String) -> Self {
        QuestionType::from(s.as_str())
    }
}

impl From<QuestionType> for String {
    fn from(t: QuestionType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Unique identifier of the option.
    pub id: String,
    /// Human label (`A`..`E`).
    pub label: String,
    /// Display text.
    #[serde(default)]
    pub text: String,
    /// Whether this option is part of the key.
    #[serde(default)]
    pub is_correct: bool,
}

/// Type-specific grading metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSettings {
    /// Expected value for `NUMBER` questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    /// Accepted absolute deviation from `target`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Lower bound of a `RANGE` slider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound of a `RANGE` slider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Step of a `RANGE` slider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// A single gradable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier.
    pub id: String,
    /// Declared question type.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// The prompt shown to participants.
    #[serde(default)]
    pub text: String,
    /// Maximum score for a fully correct answer.
    pub points: f64,
    /// Whether an empty answer is scored zero without further evaluation.
    #[serde(default)]
    pub required: bool,
    /// Ordered answer options (choice types only).
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Type-specific settings.
    #[serde(default)]
    pub settings: QuestionSettings,
}

impl Question {
    /// The first option flagged correct, in list order.
    pub fn key_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Number of options flagged correct.
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }
}

/// A named collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPackage {
    /// Unique identifier for this package.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this package.
    #[serde(default)]
    pub description: String,
    /// Time limit in minutes, enforced by the exam frontend.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Package-level evaluation policy, overriding the configured default.
    #[serde(default)]
    pub evaluation: Option<EvalConfig>,
    /// The questions, in display order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl ExamPackage {
    /// Sum of the points of all questions.
    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}
