//! Parsed directive nodes.

use serde::{Deserialize, Serialize};

/// Case applied to an extracted token field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenCase {
    /// `%(token=number)T`
    #[default]
    Keep,
    /// `%(token=number)L`
    Lower,
    /// `%(token=number)U`
    Upper,
}

impl TokenCase {
    pub fn apply(self, field: &str) -> String {
        match self {
            TokenCase::Keep => field.to_string(),
            TokenCase::Lower => field.to_lowercase(),
            TokenCase::Upper => field.to_uppercase(),
        }
    }
}

/// One unit of a parsed format template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveNode {
    /// Literal text, copied as-is
    Literal(String),
    /// `%%`
    PercentEscape,
    /// `%.`
    SeparatorEscape,
    /// `%B`
    BasenameRef,
    /// `%E`
    ExtensionRef,
    /// `%H`
    HashRef,
    /// `%S`
    SizeRef,
    /// `%(begin,end)C`
    SliceRef { begin: Option<i64>, end: Option<i64> },
    /// `%(token=number)T`, `L` and `U`; `index` is 1-based
    TokenRef {
        delimiter: String,
        index: usize,
        case: TokenCase,
    },
    /// `%(fmt)M`
    TimeRef { pattern: String },
}

impl DirectiveNode {
    /// Whether evaluating this node reads the file contents
    pub fn needs_hash(&self) -> bool {
        matches!(self, DirectiveNode::HashRef)
    }
}
