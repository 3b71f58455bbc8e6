//! # Core Module
//!
//! The front-end-agnostic rename engine.
//!
//! ## Modules
//! - `facts` - Reads size, mtime and content hash of a source file
//! - `format` - Parses and expands `%`-directive templates
//! - `stages` - Regex, extension-map and case stages
//! - `pipeline` - Runs the stages per file and plans a batch
//! - `resolver` - Validates a whole batch before anything is touched
//! - `apply` - Renames, links, or writes a shell script

pub mod apply;
pub mod facts;
pub mod format;
pub mod options;
pub mod pipeline;
pub mod resolver;
pub mod stages;

// Re-export commonly used types
pub use apply::{ApplyMode, RenameExecutor, ScriptWriter};
pub use facts::{FactProvider, FileFact, FsFacts, MemoryFacts};
pub use format::FormatTemplate;
pub use options::RenameOptions;
pub use pipeline::{DraftBatch, RenamePlan, RenameRules, Renamer};
pub use resolver::{BatchPlan, ConflictResolver, ErrorPolicy, RenameOperation};
pub use stages::{CaseMode, NameState};
