//! Evaluation policy and workspace configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Evaluation policy, supplied once per evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalConfig {
    /// Whether `MULTI_SELECT` questions may receive fractional credit.
    #[serde(default = "default_true", alias = "allow_partial_credit")]
    pub allow_partial_credit: bool,
    /// Fraction of max points subtracted per wrongly picked option
    /// (`MULTI_SELECT` with partial credit only).
    #[serde(default, alias = "wrong_pick_penalty_per_option")]
    pub wrong_pick_penalty_per_option: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            allow_partial_credit: true,
            wrong_pick_penalty_per_option: 0.0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Top-level ujian configuration (`ujian.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UjianConfig {
    /// Default evaluation policy.
    #[serde(default)]
    pub evaluation: EvalConfig,
    /// Max submissions graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./ujian-results")
}

impl Default for UjianConfig {
    fn default() -> Self {
        Self {
            evaluation: EvalConfig::default(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
            // Substituted text is not expanded again.
            from = start + value.len();
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `ujian.toml` in the current directory
/// 2. `~/.config/ujian/config.toml`
///
/// Environment variable overrides: `UJIAN_PARTIAL_CREDIT`, `UJIAN_WRONG_PICK_PENALTY`.
pub fn load_config() -> Result<UjianConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<UjianConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ujian.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => UjianConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a config from a TOML string, expanding `${VAR}` in `output_dir`.
pub fn parse_config_str(content: &str) -> Result<UjianConfig> {
    let mut config: UjianConfig = toml::from_str(content)?;
    let output_dir = config.output_dir.to_string_lossy().into_owned();
    config.output_dir = PathBuf::from(resolve_env_vars(&output_dir));
    Ok(config)
}

fn apply_env_overrides(config: &mut UjianConfig) -> Result<()> {
    if let Ok(value) = std::env::var("UJIAN_PARTIAL_CREDIT") {
        config.evaluation.allow_partial_credit = value
            .trim()
            .parse()
            .with_context(|| format!("UJIAN_PARTIAL_CREDIT is not a boolean: '{value}'"))?;
    }
    if let Ok(value) = std::env::var("UJIAN_WRONG_PICK_PENALTY") {
        config.evaluation.wrong_pick_penalty_per_option = value
            .trim()
            .parse()
            .with_context(|| format!("UJIAN_WRONG_PICK_PENALTY is not a number: '{value}'"))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ujian"))
}
