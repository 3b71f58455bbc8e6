//! # Resolver Module
//!
//! Validates a whole batch before anything is renamed.
//!
//! ## Checks
//! - Two sources claiming one destination (always an error)
//! - Destination already occupied and not vacated by the batch
//!   (an error unless overwriting)
//! - Renames that form a cycle
//! - Failed per-file plans, unless the run continues on error
//!
//! A [`BatchPlan`] can only come out of [`ConflictResolver::resolve`], so
//! every mutation works from a validated batch.

mod batch;
mod conflicts;

pub use batch::{BatchPlan, PlanReport, RenameOperation, SkippedFile, SkippedReport};
pub use conflicts::{ConflictResolver, ErrorPolicy, ResolveOptions};
