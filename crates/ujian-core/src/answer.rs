//! Raw participant answers and the conversions the engine applies to them.
//!
//! Answers arrive without structural validation, so [`RawAnswer`] accepts any
//! JSON value. The conversion methods here are the only place where the shape
//! of an answer is inspected.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AnswerOption;

/// A participant's submitted value for one question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    /// Absent or `null`.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawAnswer>),
    /// Any other JSON shape (e.g. an object). Never matches a key.
    Other(serde_json::Value),
}

impl RawAnswer {
    /// Null, an empty list, or a string that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            RawAnswer::Null => true,
            RawAnswer::List(items) => items.is_empty(),
            RawAnswer::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The answer as a single string token, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawAnswer::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The answer as a list of string tokens.
    ///
    /// A single string becomes a singleton list; non-string list elements are
    /// dropped; every other shape yields no tokens.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            RawAnswer::Text(s) => vec![s.as_str()],
            RawAnswer::List(items) => items.iter().filter_map(RawAnswer::as_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Coerce to a number: numbers as-is, non-empty numeric strings parsed,
    /// anything else `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            RawAnswer::Number(n) => *n,
            RawAnswer::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    f64::NAN
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }
}

impl From<&str> for RawAnswer {
    fn from(s: &str) -> Self {
        RawAnswer::Text(s.to_string())
    }
}

impl From<String> for RawAnswer {
    fn from(s: String) -> Self {
        RawAnswer::Text(s)
    }
}

impl From<bool> for RawAnswer {
    fn from(b: bool) -> Self {
        RawAnswer::Bool(b)
    }
}

impl From<f64> for RawAnswer {
    fn from(n: f64) -> Self {
        RawAnswer::Number(n)
    }
}

impl From<Vec<&str>> for RawAnswer {
    fn from(items: Vec<&str>) -> Self {
        RawAnswer::List(items.into_iter().map(RawAnswer::from).collect())
    }
}

/// Answers of one participant, keyed by question id. Missing keys are `Null`.
pub type AnswerSheet = HashMap<String, RawAnswer>;

/// Resolve a token to an option: exact `id` first, then case-insensitive `label`.
pub fn resolve_option<'a>(options: &'a [AnswerOption], token: &str) -> Option<&'a AnswerOption> {
    options
        .iter()
        .find(|o| o.id == token)
        .or_else(|| {
            let wanted = token.to_lowercase();
            options.iter().find(|o| o.label.to_lowercase() == wanted)
        })
}

/// One participant's submission as handed over by the answer store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Participant identifier.
    #[serde(default)]
    pub participant_id: String,
    /// When the participant submitted (or the attempt was auto-submitted).
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Raw answers keyed by question id.
    #[serde(default)]
    pub answers: AnswerSheet,
}
