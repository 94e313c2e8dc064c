//! File-backed and in-memory implementations of the collaborator traits.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::answer::{AnswerSheet, Submission};
use crate::error::StoreError;
use crate::model::ExamPackage;
use crate::parser;
use crate::traits::{AnswerStore, CatalogProvider};

/// Packages stored as TOML files under a directory.
pub struct FileCatalogProvider {
    dir: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn load_all(&self) -> Result<Vec<ExamPackage>, StoreError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || parser::load_package_directory(&dir))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
            .map_err(|e| StoreError::Malformed {
                what: format!("catalog {}", self.dir.display()),
                message: format!("{e:#}"),
            })
    }
}

#[async_trait]
impl CatalogProvider for FileCatalogProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn load_package(&self, package_id: &str) -> Result<ExamPackage, StoreError> {
        self.load_all()
            .await?
            .into_iter()
            .find(|p| p.id == package_id)
            .ok_or_else(|| StoreError::NotFound(format!("package {package_id}")))
    }

    async fn list_packages(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load_all().await?.into_iter().map(|p| p.id).collect())
    }
}

/// Submissions stored as `<participant>.json` files in one directory.
pub struct DirectoryAnswerStore {
    dir: PathBuf,
}

impl DirectoryAnswerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, participant_id: &str) -> Option<PathBuf> {
        let valid = !participant_id.is_empty()
            && !participant_id.contains(['/', '\\'])
            && participant_id != "."
            && participant_id != "..";
        valid.then(|| self.dir.join(format!("{participant_id}.json")))
    }
}

#[async_trait]
impl AnswerStore for DirectoryAnswerStore {
    fn name(&self) -> &str {
        "directory"
    }

    async fn list_participants(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut participants = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    participants.push(stem.to_string());
                }
            }
        }
        participants.sort();
        Ok(participants)
    }

    async fn load_submission(&self, participant_id: &str) -> Result<Submission, StoreError> {
        let path = self
            .path_for(participant_id)
            .ok_or_else(|| StoreError::NotFound(format!("submission {participant_id}")))?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("submission {participant_id}")));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut submission: Submission =
            serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
                what: format!("submission {}", path.display()),
                message: e.to_string(),
            })?;
        if submission.participant_id.is_empty() {
            submission.participant_id = participant_id.to_string();
        }
        Ok(submission)
    }
}

/// An in-memory answer store, for tests and for embedding the grader.
#[derive(Default)]
pub struct MemoryAnswerStore {
    submissions: HashMap<String, Submission>,
    load_count: AtomicU32,
}

impl MemoryAnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a submission for a participant.
    pub fn with_answers(mut self, participant_id: &str, answers: AnswerSheet) -> Self {
        self.submissions.insert(
            participant_id.to_string(),
            Submission {
                participant_id: participant_id.to_string(),
                submitted_at: None,
                answers,
            },
        );
        self
    }

    /// Number of submissions loaded so far.
    pub fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AnswerStore for MemoryAnswerStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_participants(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.submissions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn load_submission(&self, participant_id: &str) -> Result<Submission, StoreError> {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        self.submissions
            .get(participant_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("submission {participant_id}")))
    }
}
