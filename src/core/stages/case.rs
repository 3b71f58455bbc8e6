//! Case change stage.

use super::NameState;
use serde::{Deserialize, Serialize};

/// Case applied to the basename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMode {
    #[default]
    None,
    Upper,
    Lower,
}

impl CaseMode {
    /// Change the basename's case; the extension is left as-is
    pub fn apply(self, name: NameState) -> NameState {
        let basename = match self {
            CaseMode::None => return name,
            CaseMode::Upper => name.basename.to_uppercase(),
            CaseMode::Lower => name.basename.to_lowercase(),
        };

        NameState {
            basename,
            extension: name.extension,
        }
    }
}
