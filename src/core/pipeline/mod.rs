//! # Pipeline Module
//!
//! Orchestrates per-file name derivation.
//!
//! ## Pipeline Stages
//! 1. **Format** - Expand the template (default `%H%.%E` when no rule is given)
//! 2. **Regex** - Apply `s/OLD/NEW/` substitutions to the basename
//! 3. **Extension map** - Remap the extension, at most once
//! 4. **Case** - Upper or lower case the basename
//!
//! ## Parallelism
//! Uses rayon to plan files in parallel. Plans are independent until the
//! resolver sees the whole batch.

mod plan;
mod renamer;
mod rules;

pub use plan::{DraftBatch, RenamePlan};
pub use renamer::Renamer;
pub use rules::{RenameRules, RulesBuilder};
