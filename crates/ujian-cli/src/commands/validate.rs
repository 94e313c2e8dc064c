//! The `ujian validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(package_path: PathBuf) -> Result<()> {
    let packages = if package_path.is_dir() {
        ujian_core::parser::load_package_directory(&package_path)?
    } else {
        vec![ujian_core::parser::parse_package(&package_path)?]
    };

    let mut total_warnings = 0;

    for package in &packages {
        println!(
            "Package: {} ({} questions, {} points)",
            package.name,
            package.questions.len(),
            package.total_points()
        );

        let warnings = ujian_core::parser::validate_package(package);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All packages valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
