//! Rule set and its builder.

use crate::core::format::FormatTemplate;
use crate::core::stages::{CaseMode, ExtensionMap, Substitution, SubstitutionCount};
use crate::error::RenameError;
use tracing::debug;

/// Every rule of a run, parsed and validated
#[derive(Debug, Clone)]
pub struct RenameRules {
    format: Option<FormatTemplate>,
    substitutions: Vec<Substitution>,
    extension_map: ExtensionMap,
    case: CaseMode,
}

impl RenameRules {
    /// Create a new rules builder
    pub fn builder() -> RulesBuilder {
        RulesBuilder::new()
    }

    pub fn format(&self) -> Option<&FormatTemplate> {
        self.format.as_ref()
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn extension_map(&self) -> &ExtensionMap {
        &self.extension_map
    }

    pub fn case(&self) -> CaseMode {
        self.case
    }
}

impl Default for RenameRules {
    /// Only the default format
    fn default() -> Self {
        Self {
            format: Some(FormatTemplate::default_format()),
            substitutions: Vec::new(),
            extension_map: ExtensionMap::new(),
            case: CaseMode::None,
        }
    }
}

/// Builder for [`RenameRules`].
///
/// Rules are kept as text until [`RulesBuilder::build`], which parses all of
/// them before any file is looked at.
#[derive(Debug, Clone, Default)]
pub struct RulesBuilder {
    format: Option<String>,
    substitutions: Vec<String>,
    extension_specs: Vec<String>,
    case: CaseMode,
    count: SubstitutionCount,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the format template
    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.format = Some(template.into());
        self
    }

    /// Add an `s/OLD/NEW/` substitution; several run in the order added
    pub fn substitution(mut self, spec: impl Into<String>) -> Self {
        self.substitutions.push(spec.into());
        self
    }

    /// How many matches each substitution replaces
    pub fn substitution_count(mut self, count: SubstitutionCount) -> Self {
        self.count = count;
        self
    }

    /// Add an `OLD=NEW` extension rule
    pub fn map_extension(mut self, spec: impl Into<String>) -> Self {
        self.extension_specs.push(spec.into());
        self
    }

    /// Set the basename case change
    pub fn case(mut self, case: CaseMode) -> Self {
        self.case = case;
        self
    }

    fn is_empty(&self) -> bool {
        self.format.is_none()
            && self.substitutions.is_empty()
            && self.extension_specs.is_empty()
            && self.case == CaseMode::None
    }

    /// Parse every rule. With no rules at all, the default format applies.
    pub fn build(self) -> Result<RenameRules, RenameError> {
        if self.is_empty() {
            debug!("no rules given, defaulting to the default format");
            return Ok(RenameRules::default());
        }

        let format = self
            .format
            .as_deref()
            .map(FormatTemplate::parse)
            .transpose()?;

        let substitutions = self
            .substitutions
            .iter()
            .map(|spec| Substitution::parse(spec, self.count))
            .collect::<Result<Vec<_>, _>>()?;

        let extension_map = ExtensionMap::from_specs(&self.extension_specs)?;

        Ok(RenameRules {
            format,
            substitutions,
            extension_map,
            case: self.case,
        })
    }
}
