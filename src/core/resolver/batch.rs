//! The validated batch.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One validated rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// The destination exists and will be replaced
    pub overwrites: bool,
}

impl RenameOperation {
    /// File name of the source, used as a relative symlink target
    pub fn source_file_name(&self) -> &Path {
        self.source
            .file_name()
            .map(Path::new)
            .unwrap_or(self.source.as_path())
    }
}

/// A file left out of the batch under continue-on-error
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: FileError,
}

/// A batch that passed every check and is ready for mutation.
///
/// Operations are ordered so that a file only moves once whatever occupied
/// its destination has moved away.
#[derive(Debug)]
pub struct BatchPlan {
    operations: Vec<RenameOperation>,
    unchanged: Vec<PathBuf>,
    skipped: Vec<SkippedFile>,
}

impl BatchPlan {
    pub(crate) fn new(
        operations: Vec<RenameOperation>,
        unchanged: Vec<PathBuf>,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        Self {
            operations,
            unchanged,
            skipped,
        }
    }

    pub fn operations(&self) -> &[RenameOperation] {
        &self.operations
    }

    /// Sources whose destination equals the source
    pub fn unchanged(&self) -> &[PathBuf] {
        &self.unchanged
    }

    /// Files whose plan failed and were skipped
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Whether there is nothing to rename
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// `(original path, new path)` pairs in execution order
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.operations
            .iter()
            .map(|op| (op.source.as_path(), op.destination.as_path()))
    }

    pub fn report(&self) -> PlanReport {
        PlanReport {
            operations: self.operations.clone(),
            unchanged: self.unchanged.clone(),
            skipped: self
                .skipped
                .iter()
                .map(|s| SkippedReport {
                    path: s.path.clone(),
                    error: s.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a [`BatchPlan`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub operations: Vec<RenameOperation>,
    pub unchanged: Vec<PathBuf>,
    pub skipped: Vec<SkippedReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedReport {
    pub path: PathBuf,
    pub error: String,
}
