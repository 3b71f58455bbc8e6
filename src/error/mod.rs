//! # Error Module
//!
//! Error types for the rename engine.
//!
//! ## Taxonomy
//! - **Fatal before any file is touched**: [`ParseError`] (format template)
//!   and [`RuleError`] (regex and extension-map rules)
//! - **Per file**: [`FileError`], wrapping [`FactError`], [`FormatError`]
//!   and [`StageError`]
//! - **Per batch**: [`ConflictError`], always reported in full
//! - **Mutation**: [`ApplyError`]

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum RenameError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("{} conflict(s) found; nothing was renamed", .0.len())]
    Conflicts(Vec<ConflictError>),

    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    #[error("{failed} of {total} operation(s) failed")]
    ApplyFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No action to take")]
    NothingToDo,
}

/// A malformed format template.
///
/// Parsing is atomic: a template that produces this error never expands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error parsing {template:?} at index {position}: {kind} (near {fragment:?})")]
pub struct ParseError {
    /// The full template being parsed
    pub template: String,
    /// Byte offset of the offending directive
    pub position: usize,
    /// The offending substring
    pub fragment: String,
    pub kind: ParseErrorKind,
}

/// What went wrong while parsing a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("reached end of string after '%'")]
    TrailingPercent,

    #[error("reached end of string while searching for ')'")]
    UnclosedArguments,

    #[error("argument list is not followed by a directive letter")]
    MissingDirective,

    #[error("unknown directive {0:?}")]
    UnknownDirective(char),

    #[error("directive {0:?} requires an argument list")]
    MissingArguments(char),

    #[error("directive {0:?} does not take arguments")]
    UnexpectedArguments(char),

    #[error("slice bounds are missing the ',' separator")]
    MissingComma,

    #[error("slice bound {0:?} must be empty or an integer")]
    InvalidBound(String),

    #[error("token argument is missing the '=' separator")]
    MissingEquals,

    #[error("token delimiter must not be empty")]
    EmptyDelimiter,

    #[error("field index {0:?} is not a positive integer")]
    InvalidFieldIndex(String),

    #[error("field numbering starts at 1")]
    ZeroFieldIndex,

    #[error("missing timestamp format")]
    EmptyTimeFormat,
}

/// A malformed regex or extension-map rule
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("failed to parse {spec:?}: not in s/OLD/NEW/ format")]
    NotSubstitution { spec: String },

    #[error("invalid regular expression {pattern:?}: {error}")]
    InvalidRegex {
        pattern: String,
        #[source]
        error: regex::Error,
    },

    #[error("failed to parse {spec:?}: not in OLD=NEW format")]
    NotExtensionMapping { spec: String },

    #[error("extension mapping {spec:?}: extensions cannot contain the separator")]
    ExtensionSeparator { spec: String },
}

/// Failure to read the facts of a source file
#[derive(Error, Debug)]
pub enum FactError {
    #[error("Source not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read metadata for {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error("File name is not valid UTF-8: {path}")]
    NotUtf8 { path: PathBuf },
}

/// Failure while evaluating a parsed template against one file
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("{name:?}: token index {index} (for {delimiter:?}) too big; name has {fields} field(s)")]
    FieldIndex {
        name: String,
        delimiter: String,
        index: usize,
        fields: usize,
    },

    #[error("invalid timestamp format {pattern:?}")]
    TimeFormat { pattern: String },

    #[error("Failed to hash {path}: {source}")]
    HashRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure in a pipeline stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("new name is empty")]
    EmptyName,

    #[error("new name {name:?} contains a path separator")]
    PathSeparator { name: String },

    #[error("new name {name:?} is reserved")]
    ReservedName { name: String },
}

/// Everything that can abort one file's plan
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Facts(#[from] FactError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A batch-level problem found before any mutation
#[derive(Error, Debug)]
pub enum ConflictError {
    #[error("{} files would be renamed to {destination}: {sources:?}", .sources.len())]
    Collision {
        destination: PathBuf,
        sources: Vec<PathBuf>,
    },

    #[error("failed to rename {path}: new path {destination} exists")]
    DestinationExists { path: PathBuf, destination: PathBuf },

    #[error("renames form a cycle: {sources:?}")]
    Cycle { sources: Vec<PathBuf> },

    #[error("failed to plan {path}: {error}")]
    PlanFailed {
        path: PathBuf,
        #[source]
        error: FileError,
    },
}

/// Failure while mutating the filesystem or writing a script
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("failed to rename {from} to {to}: destination exists")]
    DestinationExists { from: PathBuf, to: PathBuf },

    #[error("failed to rename {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, RenameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_includes_position_and_fragment() {
        let error = ParseError {
            template: "%B%Q".to_string(),
            position: 2,
            fragment: "%Q".to_string(),
            kind: ParseErrorKind::UnknownDirective('Q'),
        };
        let message = error.to_string();
        assert!(message.contains("index 2"));
        assert!(message.contains("\"%Q\""));
        assert!(message.contains("unknown directive 'Q'"));
    }

    #[test]
    fn collision_lists_every_source() {
        let error = ConflictError::Collision {
            destination: PathBuf::from("/tmp/out.txt"),
            sources: vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")],
        };
        let message = error.to_string();
        assert!(message.contains("/tmp/out.txt"));
        assert!(message.contains("a.txt"));
        assert!(message.contains("b.txt"));
    }

    #[test]
    fn file_error_is_transparent() {
        let error = FileError::from(StageError::EmptyName);
        assert_eq!(error.to_string(), "new name is empty");
    }

    #[test]
    fn conflicts_summary_counts_entries() {
        let error = RenameError::Conflicts(vec![ConflictError::Cycle {
            sources: vec![PathBuf::from("a"), PathBuf::from("b")],
        }]);
        assert!(error.to_string().starts_with("1 conflict(s)"));
    }
}
