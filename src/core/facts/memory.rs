//! In-memory fact provider for testing and embedding.

use super::{normalize_path, FactProvider, FileStat};
use crate::error::FactError;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;

struct MemoryFile {
    contents: Vec<u8>,
    modified: SystemTime,
}

/// In-memory fact provider
///
/// Useful for testing and for callers whose file list does not live on a
/// local disk.
pub struct MemoryFacts {
    files: RwLock<HashMap<PathBuf, MemoryFile>>,
    opens: AtomicUsize,
}

impl MemoryFacts {
    /// Create an empty provider
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            opens: AtomicUsize::new(0),
        }
    }

    /// Builder-style [`MemoryFacts::insert`]
    pub fn with_file(
        self,
        path: impl Into<PathBuf>,
        contents: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) -> Self {
        self.insert(path, contents, modified);
        self
    }

    /// Add or replace a file. `./a.txt` and `a.txt` are the same entry.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>, modified: SystemTime) {
        let path = normalize_path(&path.into());
        if let Ok(mut files) = self.files.write() {
            files.insert(
                path,
                MemoryFile {
                    contents: contents.into(),
                    modified,
                },
            );
        }
    }

    /// Number of times file contents were opened
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl Default for MemoryFacts {
    fn default() -> Self {
        Self::new()
    }
}

impl FactProvider for MemoryFacts {
    fn stat(&self, path: &Path) -> Result<FileStat, FactError> {
        let files = self.files.read().map_err(|_| FactError::Metadata {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "memory provider lock poisoned"),
        })?;

        files
            .get(&normalize_path(path))
            .map(|file| FileStat {
                size: file.contents.len() as u64,
                modified: file.modified,
            })
            .ok_or_else(|| FactError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send + '_>> {
        let files = self
            .files
            .read()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory provider lock poisoned"))?;

        let file = files
            .get(&normalize_path(path))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;

        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(file.contents.clone())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(&normalize_path(path)))
            .unwrap_or(false)
    }
}
