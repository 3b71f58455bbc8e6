//! # Apply Module
//!
//! Turns a validated [`BatchPlan`](crate::core::resolver::BatchPlan) into
//! filesystem changes or into a shell script.
//!
//! ## Modes
//! - `Move` - rename the source in place
//! - `Symlink` - leave the source and add a relative symlink at the new name
//! - `Hardlink` - leave the source and add a hard link at the new name

mod executor;
mod script;

pub use executor::{ApplyResult, RenameExecutor};
pub use script::{shell_quote, ScriptWriter};

use serde::{Deserialize, Serialize};

/// How a validated rename is carried out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    #[default]
    Move,
    Symlink,
    Hardlink,
}

impl ApplyMode {
    /// Whether applying removes the source path
    pub fn vacates_sources(&self) -> bool {
        matches!(self, ApplyMode::Move)
    }
}
