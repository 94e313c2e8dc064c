pub mod check;
pub mod compare;
pub mod grade;
pub mod init;
pub mod review;
pub mod validate;

use ujian_core::config::{EvalConfig, UjianConfig};
use ujian_core::model::ExamPackage;

/// Evaluation policy for a package: the package's own `[evaluation]` table
/// wins over the config file.
pub(crate) fn package_eval(config: &UjianConfig, package: &ExamPackage) -> EvalConfig {
    package.evaluation.unwrap_or(config.evaluation)
}
