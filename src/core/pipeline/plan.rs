//! Per-file plans and the unvalidated batch.

use crate::core::stages::NameState;
use crate::error::FileError;
use std::path::{Path, PathBuf};

/// The computed, not yet validated outcome for one source
#[derive(Debug)]
pub enum RenamePlan {
    /// A destination was derived
    Planned {
        source: PathBuf,
        name: NameState,
        destination: PathBuf,
    },
    /// A stage failed for this file
    Failed { source: PathBuf, error: FileError },
}

impl RenamePlan {
    pub fn source(&self) -> &Path {
        match self {
            RenamePlan::Planned { source, .. } | RenamePlan::Failed { source, .. } => source,
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            RenamePlan::Planned { destination, .. } => Some(destination),
            RenamePlan::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RenamePlan::Failed { .. })
    }
}

/// Every plan of a run, in input order, not yet checked as a whole.
///
/// Nothing can be applied from a draft; it has to go through
/// [`ConflictResolver`](crate::core::resolver::ConflictResolver) first.
#[derive(Debug, Default)]
pub struct DraftBatch {
    plans: Vec<RenamePlan>,
}

impl DraftBatch {
    pub fn new(plans: Vec<RenamePlan>) -> Self {
        Self { plans }
    }

    pub fn plans(&self) -> &[RenamePlan] {
        &self.plans
    }

    pub fn into_plans(self) -> Vec<RenamePlan> {
        self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.plans.iter().filter(|p| p.is_failed()).count()
    }
}
