//! The `ujian init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("ujian.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("packages").context("failed to create packages/")?;
    write_if_missing(Path::new("packages/contoh.toml"), EXAMPLE_PACKAGE)?;

    std::fs::create_dir_all("answers/contoh").context("failed to create answers/contoh/")?;
    write_if_missing(Path::new("answers/contoh/siswa-01.json"), EXAMPLE_SUBMISSION)?;

    println!("\nNext steps:");
    println!("  1. Edit packages/contoh.toml with your questions and answer key");
    println!("  2. Run: ujian validate --package packages/contoh.toml");
    println!("  3. Run: ujian grade --package packages/contoh.toml --answers answers/contoh");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ujian configuration

parallelism = 4
output_dir = "./ujian-results"

[evaluation]
allow_partial_credit = true
wrong_pick_penalty_per_option = 0.0
"#;

const EXAMPLE_PACKAGE: &str = r#"[package]
id = "contoh"
name = "Kuis Contoh"
description = "Paket contoh untuk memulai"
duration_minutes = 15

[[questions]]
id = "ibukota"
type = "SINGLE_CHOICE"
text = "Ibu kota Indonesia adalah..."
points = 1
required = true

[[questions.options]]
id = "ibukota-a"
label = "A"
text = "Jakarta"
is_correct = true

[[questions.options]]
id = "ibukota-b"
label = "B"
text = "Bandung"

[[questions]]
id = "prima"
type = "MULTI_SELECT"
text = "Pilih semua bilangan prima."
points = 2
required = true

[[questions.options]]
id = "prima-a"
label = "A"
text = "2"
is_correct = true

[[questions.options]]
id = "prima-b"
label = "B"
text = "4"

[[questions.options]]
id = "prima-c"
label = "C"
text = "7"
is_correct = true

[[questions]]
id = "akar"
type = "NUMBER"
text = "Berapakah akar kuadrat dari 2? (dua desimal)"
points = 1

[questions.settings]
target = 1.41
tolerance = 0.005

[[questions]]
id = "pendapat"
type = "ESSAY"
text = "Mengapa belajar matematika itu penting?"
points = 3
"#;

const EXAMPLE_SUBMISSION: &str = r#"{
  "participantId": "siswa-01",
  "answers": {
    "ibukota": "A",
    "prima": ["A", "B"],
    "akar": "1.414",
    "pendapat": "Karena melatih cara berpikir."
  }
}
"#;
