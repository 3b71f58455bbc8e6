//! Fact provider trait definition.

use super::FileStat;
use crate::error::FactError;
use std::io::{self, Read};
use std::path::Path;

/// Read-only source of per-file facts.
///
/// The engine never touches the filesystem directly; everything it learns
/// about a source or a destination comes through this trait.
pub trait FactProvider: Send + Sync {
    /// Size and modification time of a file
    fn stat(&self, path: &Path) -> Result<FileStat, FactError>;

    /// Open the file contents for hashing
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Whether anything currently occupies `path`
    fn exists(&self, path: &Path) -> bool;
}
