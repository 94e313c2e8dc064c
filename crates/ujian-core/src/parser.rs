//! TOML package parser.
//!
//! Loads exam packages from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::EvalConfig;
use crate::model::{AnswerOption, ExamPackage, Question, QuestionSettings, QuestionType};

/// Intermediate TOML structure for parsing package files.
#[derive(Debug, Deserialize)]
struct TomlPackageFile {
    package: TomlPackageHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlPackageHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    evaluation: Option<EvalConfig>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default = "default_points")]
    points: f64,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    options: Vec<TomlOption>,
    #[serde(default)]
    settings: Option<TomlSettings>,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    label: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
struct TomlSettings {
    #[serde(default)]
    target: Option<f64>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    step: Option<f64>,
}

/// Parse a single TOML file into an `ExamPackage`.
pub fn parse_package(path: &Path) -> Result<ExamPackage> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read package file: {}", path.display()))?;

    parse_package_str(&content, path)
}

/// Parse a TOML string into an `ExamPackage` (useful for testing).
pub fn parse_package_str(content: &str, source_path: &Path) -> Result<ExamPackage> {
    let parsed: TomlPackageFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            kind: QuestionType::from(q.kind),
            text: q.text,
            points: q.points,
            required: q.required,
            options: q
                .options
                .into_iter()
                .map(|o| AnswerOption {
                    id: o.id,
                    label: o.label,
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
            settings: match q.settings {
                Some(s) => QuestionSettings {
                    target: s.target,
                    tolerance: s.tolerance,
                    min: s.min,
                    max: s.max,
                    step: s.step,
                },
                None => QuestionSettings::default(),
            },
        })
        .collect();

    Ok(ExamPackage {
        id: parsed.package.id,
        name: parsed.package.name,
        description: parsed.package.description,
        duration_minutes: parsed.package.duration_minutes,
        evaluation: parsed.package.evaluation,
        questions,
    })
}

/// Recursively load all `.toml` package files from a directory.
pub fn load_package_directory(dir: &Path) -> Result<Vec<ExamPackage>> {
    let mut packages = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            packages.extend(load_package_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_package(&path) {
                Ok(package) => packages.push(package),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(packages)
}

/// A warning from package validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(question: &Question, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a package for authoring defects the engine would grade silently.
pub fn validate_package(package: &ExamPackage) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in &package.questions {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning::question(
                q,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    if let Some(eval) = &package.evaluation {
        if eval.wrong_pick_penalty_per_option < 0.0 {
            warnings.push(ValidationWarning {
                question_id: None,
                message: "wrong_pick_penalty_per_option is negative".into(),
            });
        }
    }

    for q in &package.questions {
        if q.points < 0.0 || q.points.is_nan() {
            warnings.push(ValidationWarning::question(q, "points must be non-negative"));
        }

        let mut seen_options = HashSet::new();
        for o in &q.options {
            if !seen_options.insert(o.id.as_str()) {
                warnings.push(ValidationWarning::question(
                    q,
                    format!("duplicate option ID: {}", o.id),
                ));
            }
        }

        if q.kind.uses_options() && q.options.is_empty() {
            warnings.push(ValidationWarning::question(q, "choice question has no options"));
        }

        match &q.kind {
            QuestionType::SingleChoice | QuestionType::TrueFalse => {
                let keys = q.correct_count();
                if keys != 1 {
                    warnings.push(ValidationWarning::question(
                        q,
                        format!("expected exactly one correct option, found {keys}"),
                    ));
                }
            }
            QuestionType::MultiSelect => {
                if q.correct_count() == 0 {
                    warnings.push(ValidationWarning::question(q, "no option is marked correct"));
                }
            }
            QuestionType::Number => {
                if q.settings.target.is_none() {
                    warnings.push(ValidationWarning::question(
                        q,
                        "NUMBER question has no target; it will always need review",
                    ));
                }
                if q.settings.tolerance.is_some_and(|t| t < 0.0) {
                    warnings.push(ValidationWarning::question(
                        q,
                        "negative tolerance is treated as 0",
                    ));
                }
            }
            QuestionType::Range => {
                if let (Some(min), Some(max)) = (q.settings.min, q.settings.max) {
                    if min > max {
                        warnings.push(ValidationWarning::question(q, "range min is above max"));
                    }
                }
            }
            QuestionType::ShortText | QuestionType::Essay => {}
            QuestionType::Other(name) => {
                warnings.push(ValidationWarning::question(
                    q,
                    format!("unknown question type '{name}'; it will always need review"),
                ));
            }
        }
    }

    warnings
}
