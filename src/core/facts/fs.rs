//! Filesystem-backed fact provider.

use super::{FactProvider, FileStat};
use crate::error::FactError;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Reads facts from the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFacts;

impl FsFacts {
    pub fn new() -> Self {
        Self
    }
}

impl FactProvider for FsFacts {
    fn stat(&self, path: &Path) -> Result<FileStat, FactError> {
        let metadata = fs::metadata(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FactError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FactError::Metadata {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let modified = metadata.modified().map_err(|source| FactError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(FileStat {
            size: metadata.len(),
            modified,
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }

    fn exists(&self, path: &Path) -> bool {
        // A dangling symlink still occupies the name
        fs::symlink_metadata(path).is_ok()
    }
}
