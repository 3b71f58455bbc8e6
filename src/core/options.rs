//! Run configuration shared by the resolver and the executor.

use super::apply::{ApplyMode, RenameExecutor};
use super::resolver::{ErrorPolicy, ResolveOptions};
use serde::{Deserialize, Serialize};

/// How a batch is validated and applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenameOptions {
    pub policy: ErrorPolicy,
    /// Replace existing destinations
    pub overwrite: bool,
    /// Stop after validation
    pub dry_run: bool,
    pub mode: ApplyMode,
}

impl RenameOptions {
    /// Continue on error; implies overwrite
    pub fn force(mut self) -> Self {
        self.policy = ErrorPolicy::Continue;
        self.overwrite = true;
        self
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            overwrite: self.overwrite,
            policy: self.policy,
            vacates_sources: self.mode.vacates_sources(),
        }
    }

    pub fn executor(&self) -> RenameExecutor {
        RenameExecutor::new(self.mode, self.overwrite || self.policy == ErrorPolicy::Continue)
    }
}
