//! Regular expression substitution stage.

use super::NameState;
use crate::error::{RuleError, StageError};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How many matches a substitution replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionCount {
    /// Every non-overlapping match
    #[default]
    All,
    /// Only the leftmost match
    First,
}

/// A compiled `s/OLD/NEW/` rule.
///
/// `NEW` uses the regex crate's replacement syntax: `$1`, `${name}`, `$$`.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
    count: SubstitutionCount,
}

impl Substitution {
    /// Parse `s/OLD/NEW/`. A `/` inside `OLD` or `NEW` is written `\/`.
    pub fn parse(spec: &str, count: SubstitutionCount) -> Result<Self, RuleError> {
        let (pattern, replacement) =
            split_substitution(spec).ok_or_else(|| RuleError::NotSubstitution {
                spec: spec.to_string(),
            })?;

        let compiled = Regex::new(&pattern).map_err(|error| RuleError::InvalidRegex {
            pattern: pattern.clone(),
            error,
        })?;

        Ok(Self {
            pattern: compiled,
            replacement,
            count,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Substitute within the basename; the extension is untouched
    pub fn apply(&self, name: NameState) -> Result<NameState, StageError> {
        let limit = match self.count {
            SubstitutionCount::All => 0,
            SubstitutionCount::First => 1,
        };
        let basename = self
            .pattern
            .replacen(&name.basename, limit, self.replacement.as_str())
            .into_owned();

        let result = NameState {
            basename,
            extension: name.extension,
        };
        if result.is_empty() {
            return Err(StageError::EmptyName);
        }
        Ok(result)
    }
}

/// Split `s/OLD/NEW/` into its two parts, unescaping `\/`
fn split_substitution(spec: &str) -> Option<(String, String)> {
    let body = spec.strip_prefix("s/")?;
    let mut parts = Vec::with_capacity(2);
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('/') => current.push('/'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => return None,
            },
            '/' => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    if parts.len() != 2 || !current.is_empty() {
        return None;
    }

    let replacement = parts.pop()?;
    let pattern = parts.pop()?;
    Some((pattern, replacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(spec: &str) -> Substitution {
        Substitution::parse(spec, SubstitutionCount::All).unwrap()
    }

    #[test]
    fn splits_specification() {
        assert_eq!(
            split_substitution("s/foo/bar/"),
            Some(("foo".to_string(), "bar".to_string()))
        );
        assert_eq!(
            split_substitution("s/a\\/b/c/"),
            Some(("a/b".to_string(), "c".to_string()))
        );
        assert_eq!(
            split_substitution("s/\\d+//"),
            Some(("\\d+".to_string(), String::new()))
        );
    }

    #[test]
    fn rejects_malformed_specification() {
        for spec in ["foo/bar/", "s/foo/bar", "s/a/b/c/", "s/foo/", "s/a/b/\\"] {
            assert!(
                matches!(
                    Substitution::parse(spec, SubstitutionCount::All),
                    Err(RuleError::NotSubstitution { .. })
                ),
                "{spec}"
            );
        }
    }

    #[test]
    fn rejects_invalid_regex() {
        assert!(matches!(
            Substitution::parse("s/(unclosed/x/", SubstitutionCount::All),
            Err(RuleError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn replaces_every_match_by_default() {
        let name = sub("s/a/o/").apply(NameState::new("banana", "txt")).unwrap();
        assert_eq!(name, NameState::new("bonono", "txt"));
    }

    #[test]
    fn first_only_replaces_leftmost_match() {
        let first = Substitution::parse("s/a/o/", SubstitutionCount::First).unwrap();
        let name = first.apply(NameState::new("banana", "txt")).unwrap();
        assert_eq!(name.basename, "bonana");
    }

    #[test]
    fn never_touches_extension() {
        let name = sub("s/txt/md/").apply(NameState::new("txt-notes", "txt")).unwrap();
        assert_eq!(name, NameState::new("md-notes", "txt"));
    }

    #[test]
    fn supports_capture_groups() {
        let name = sub("s/(\\w+)-(\\w+)/${2}_$1/")
            .apply(NameState::new("left-right", "csv"))
            .unwrap();
        assert_eq!(name.basename, "right_left");
    }

    #[test]
    fn erasing_the_whole_name_fails() {
        let result = sub("s/.*//").apply(NameState::new("gone", ""));
        assert_eq!(result, Err(StageError::EmptyName));
    }
}
