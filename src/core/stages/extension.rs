//! Extension remap stage.

use super::NameState;
use crate::core::facts::EXTENSION_SEPARATOR;
use crate::error::RuleError;

/// Ordered `OLD=NEW` extension rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMap {
    rules: Vec<(String, String)>,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules in the order given
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, RuleError> {
        let mut map = Self::new();
        for spec in specs {
            map.push_spec(spec.as_ref())?;
        }
        Ok(map)
    }

    /// Parse and append one `OLD=NEW` rule.
    ///
    /// An empty `OLD` matches files without an extension; an empty `NEW`
    /// drops the extension.
    pub fn push_spec(&mut self, spec: &str) -> Result<(), RuleError> {
        let (old, new) = spec
            .split_once('=')
            .ok_or_else(|| RuleError::NotExtensionMapping {
                spec: spec.to_string(),
            })?;

        if old.contains(EXTENSION_SEPARATOR) || new.contains(EXTENSION_SEPARATOR) {
            return Err(RuleError::ExtensionSeparator {
                spec: spec.to_string(),
            });
        }

        self.rules.push((old.to_string(), new.to_string()));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    /// Replace the extension with the first matching rule's target.
    ///
    /// At most one rule fires, so `csv=txt` followed by `txt=html` never
    /// turns `csv` into `html`.
    pub fn apply(&self, name: NameState) -> NameState {
        match self.rules.iter().find(|(old, _)| *old == name.extension) {
            Some((_, new)) => NameState {
                basename: name.basename,
                extension: new.clone(),
            },
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_once() {
        let map = ExtensionMap::from_specs(&["csv=txt", "txt=html"]).unwrap();
        assert_eq!(
            map.apply(NameState::new("rows", "csv")),
            NameState::new("rows", "txt")
        );
        assert_eq!(
            map.apply(NameState::new("text", "txt")),
            NameState::new("text", "html")
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let map = ExtensionMap::from_specs(&["jpeg=jpg", "jpeg=JPG"]).unwrap();
        assert_eq!(
            map.apply(NameState::new("photo", "jpeg")).extension,
            "jpg"
        );
    }

    #[test]
    fn unmatched_extension_is_untouched() {
        let map = ExtensionMap::from_specs(&["csv=txt"]).unwrap();
        let name = NameState::new("notes", "md");
        assert_eq!(map.apply(name.clone()), name);
    }

    #[test]
    fn empty_sides_add_and_drop_extensions() {
        let map = ExtensionMap::from_specs(&["=md", "bak="]).unwrap();
        assert_eq!(map.apply(NameState::new("README", "")).file_name(), "README.md");
        assert_eq!(map.apply(NameState::new("old", "bak")).file_name(), "old");
    }

    #[test]
    fn rejects_malformed_rules() {
        assert!(matches!(
            ExtensionMap::from_specs(&["csv"]),
            Err(RuleError::NotExtensionMapping { .. })
        ));
        assert!(matches!(
            ExtensionMap::from_specs(&["gz=tar.gz"]),
            Err(RuleError::ExtensionSeparator { .. })
        ));
    }
}
