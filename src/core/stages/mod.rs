//! # Stages Module
//!
//! The name transformations that run after formatting.
//!
//! Every stage takes a [`NameState`] and returns a new one; only the
//! extension-map stage may change the extension.
//!
//! ## Stages
//! - `Substitution` - `s/OLD/NEW/` regular expression on the basename
//! - `ExtensionMap` - `OLD=NEW` extension remap, at most once per file
//! - `CaseMode` - upper or lower case the basename

mod case;
mod extension;
mod substitution;

pub use substitution::{Substitution, SubstitutionCount};
pub use case::CaseMode;
pub use extension::ExtensionMap;

use crate::core::facts::{split_file_name, EXTENSION_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A file name split into basename and extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameState {
    pub basename: String,
    /// Never contains the separator
    pub extension: String,
}

impl NameState {
    pub fn new(basename: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
            extension: extension.into(),
        }
    }

    /// Split at the last separator
    pub fn from_file_name(file_name: &str) -> Self {
        let (basename, extension) = split_file_name(file_name);
        Self::new(basename, extension)
    }

    /// Join back into a file name, omitting the separator when there is no extension
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.basename.clone()
        } else {
            format!("{}{}{}", self.basename, EXTENSION_SEPARATOR, self.extension)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.basename.is_empty() && self.extension.is_empty()
    }
}

impl fmt::Display for NameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
