//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while renaming a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Per-file planning
    Plan(PlanEvent),
    /// Batch validation
    Resolve(ResolveEvent),
    /// Filesystem mutation
    Apply(ApplyEvent),
}

/// Events while computing per-file plans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanEvent {
    /// Planning has started
    Started { total_files: usize },
    /// A file's plan was computed
    Progress(PlanProgress),
    /// A file's plan failed; whether that is fatal is decided later
    FileFailed { path: PathBuf, message: String },
    /// Every plan was computed
    Completed { planned: usize, failed: usize },
}

/// Progress information during planning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanProgress {
    /// Number of files planned so far
    pub completed: usize,
    /// Total number of files
    pub total: usize,
    /// File just planned
    pub current_path: PathBuf,
}

/// Events from the conflict resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// Validation finished
    Completed {
        operations: usize,
        unchanged: usize,
        conflicts: usize,
    },
}

/// Events while applying a validated batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApplyEvent {
    /// Mutation has started
    Started { total: usize },
    /// One operation succeeded
    Applied { from: PathBuf, to: PathBuf },
    /// One operation failed
    Failed { path: PathBuf, message: String },
    /// Mutation finished
    Completed { applied: usize, failed: usize },
}
