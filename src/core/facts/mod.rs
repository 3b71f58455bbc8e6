//! # Facts Module
//!
//! Read-only facts about one source file, as needed by format directives.
//!
//! ## Fields
//! - Basename and extension (split at the last separator)
//! - Size in bytes and modification time
//! - SHA-256 prefix, computed on first demand and kept on the fact record
//!
//! ## Providers
//! - `FsFacts` - The real filesystem
//! - `MemoryFacts` - In-memory files, for testing

mod fs;
mod memory;
mod traits;

pub use fs::FsFacts;
pub use memory::MemoryFacts;
pub use traits::FactProvider;

use crate::error::{FactError, FormatError};
use sha2::{Digest, Sha256};
use std::cell::OnceCell;
use std::fmt;
use std::io;
use std::path::{self, Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::trace;

/// The extension separator character
pub const EXTENSION_SEPARATOR: char = '.';

/// Number of hex characters kept from the content digest
pub const HASH_PREFIX_LEN: usize = 8;

/// Size and modification time of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
}

/// Drop `.` components so `./a.txt` and `a.txt` are one path.
///
/// `..` is kept; it cannot be folded without resolving symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        normalized
    }
}

/// Identity used when comparing paths within a batch.
///
/// Relative paths are joined onto the working directory lexically, so
/// `a.txt`, `./a.txt` and its absolute spelling share one key.
pub fn path_key(path: &Path) -> PathBuf {
    let normalized = normalize_path(path);
    path::absolute(&normalized).unwrap_or(normalized)
}

/// Split a file name into basename and extension.
///
/// At most one extension is recognized: `archive.tar.gz` splits into
/// `archive.tar` and `gz`. A name without a separator has an empty extension.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    file_name
        .rsplit_once(EXTENSION_SEPARATOR)
        .unwrap_or((file_name, ""))
}

/// Immutable snapshot of one input file
pub struct FileFact<'p> {
    path: PathBuf,
    basename: String,
    extension: String,
    size_bytes: u64,
    modified: SystemTime,
    hash_prefix: OnceCell<String>,
    provider: &'p dyn FactProvider,
}

impl<'p> FileFact<'p> {
    /// Read the facts for `path` from `provider`.
    ///
    /// The content hash is not computed here; see [`FileFact::hash_prefix`].
    pub fn extract(path: &Path, provider: &'p dyn FactProvider) -> Result<Self, FactError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| FactError::NoFileName {
                path: path.to_path_buf(),
            })?
            .to_str()
            .ok_or_else(|| FactError::NotUtf8 {
                path: path.to_path_buf(),
            })?;

        let stat = provider.stat(path)?;
        let (basename, extension) = split_file_name(file_name);

        Ok(Self {
            path: path.to_path_buf(),
            basename: basename.to_string(),
            extension: extension.to_string(),
            size_bytes: stat.size,
            modified: stat.modified,
            hash_prefix: OnceCell::new(),
            provider,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// First eight hex characters of the SHA-256 digest of the contents.
    ///
    /// The file is read on the first call only; later calls reuse the value.
    pub fn hash_prefix(&self) -> Result<&str, FormatError> {
        if let Some(prefix) = self.hash_prefix.get() {
            return Ok(prefix.as_str());
        }

        let prefix = self.compute_hash_prefix().map_err(|source| FormatError::HashRead {
            path: self.path.clone(),
            source,
        })?;
        trace!("hashed {:?} -> {}", self.path, prefix);

        Ok(self.hash_prefix.get_or_init(|| prefix).as_str())
    }

    fn compute_hash_prefix(&self) -> io::Result<String> {
        let mut reader = self.provider.open(&self.path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(HASH_PREFIX_LEN);
        Ok(digest)
    }
}

impl fmt::Debug for FileFact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFact")
            .field("path", &self.path)
            .field("basename", &self.basename)
            .field("extension", &self.extension)
            .field("size_bytes", &self.size_bytes)
            .field("modified", &self.modified)
            .field("hash_prefix", &self.hash_prefix.get())
            .finish()
    }
}
