//! Collaborator traits for the sources of packages and submissions.
//!
//! The evaluation engine never fetches data itself; the batch grader asks
//! these traits for it. File-backed and in-memory implementations live in
//! [`crate::store`].

use async_trait::async_trait;

use crate::answer::Submission;
use crate::error::StoreError;
use crate::model::ExamPackage;

// ---------------------------------------------------------------------------
// Question catalog
// ---------------------------------------------------------------------------

/// Supplies exam packages with resolved options and settings.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Human-readable provider name (e.g. "file").
    fn name(&self) -> &str;

    /// Load one package by id.
    async fn load_package(&self, package_id: &str) -> Result<ExamPackage, StoreError>;

    /// List the ids of all available packages.
    async fn list_packages(&self) -> Result<Vec<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// Answer store
// ---------------------------------------------------------------------------

/// Supplies raw participant answers.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    /// Human-readable store name (e.g. "directory").
    fn name(&self) -> &str;

    /// List every participant that has a submission.
    async fn list_participants(&self) -> Result<Vec<String>, StoreError>;

    /// Load one participant's submission.
    async fn load_submission(&self, participant_id: &str) -> Result<Submission, StoreError>;
}
