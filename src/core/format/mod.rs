//! # Format Module
//!
//! printf-style name templates.
//!
//! ## Directives
//! - `%%` a literal percent sign, `%.` the extension separator
//! - `%B` basename, `%E` extension, `%H` hash prefix, `%S` size in bytes
//! - `%(begin,end)C` a slice of the basename; negative bounds count from the end
//! - `%(token=number)T` the numbered field of the basename split on `token`;
//!   `L` and `U` lowercase or uppercase the field
//! - `%(fmt)M` the modification time through strftime
//!
//! ## Example
//! ```rust
//! use bulk_rename::core::format::FormatTemplate;
//!
//! let template = FormatTemplate::parse("%(-=2)U%.%E").unwrap();
//! assert!(!template.needs_hash());
//! ```

mod expander;
mod node;
mod parser;

pub use expander::{expand, format_time, slice_chars, token_field};
pub use node::{DirectiveNode, TokenCase};
pub use parser::parse;

use crate::core::facts::FileFact;
use crate::error::{FormatError, ParseError};

/// Template applied when no rule of any kind is given
pub const DEFAULT_FORMAT: &str = "%H%.%E";

/// A parsed template together with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    nodes: Vec<DirectiveNode>,
}

impl FormatTemplate {
    /// Parse a template, failing on the first malformed directive
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            source: source.to_string(),
            nodes: parse(source)?,
        })
    }

    /// The template used when no rules are supplied
    pub fn default_format() -> Self {
        Self {
            source: DEFAULT_FORMAT.to_string(),
            nodes: vec![
                DirectiveNode::HashRef,
                DirectiveNode::SeparatorEscape,
                DirectiveNode::ExtensionRef,
            ],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[DirectiveNode] {
        &self.nodes
    }

    /// Whether expanding this template reads file contents
    pub fn needs_hash(&self) -> bool {
        self.nodes.iter().any(DirectiveNode::needs_hash)
    }

    pub fn expand(&self, fact: &FileFact<'_>) -> Result<String, FormatError> {
        expand(&self.nodes, fact)
    }
}
