use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Storage key the saved-forms list lives under.
pub const DEFAULT_STORAGE_KEY: &str = "formBuilder_savedForms";

/// Prefix prepended to a parent field id to form its formula variable name.
pub const DEFAULT_VARIABLE_PREFIX: &str = "field_";

/// Runtime configuration shared by the engines, the preview session and the stores.
///
/// Every field has a default, so a config file only needs the keys it overrides:
///
/// ```json
/// { "storage_key": "myApp_forms", "formula": { "max_depth": 16 } }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub storage_key: String,
    pub variable_prefix: String,
    pub formula: FormulaLimits,
}

/// Bounds applied to user-authored formulas before they are parsed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FormulaLimits {
    /// Maximum formula length in characters.
    pub max_length: usize,
    /// Maximum nesting depth of parenthesised or chained sub-expressions.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            variable_prefix: DEFAULT_VARIABLE_PREFIX.to_string(),
            formula: FormulaLimits::default(),
        }
    }
}

impl Default for FormulaLimits {
    fn default() -> Self {
        Self {
            max_length: 1024,
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Name of the formula variable bound to `field_id`.
    ///
    /// Field ids are usually UUIDs, so every character that cannot appear in
    /// an identifier is replaced with `_`.
    pub fn variable_name(&self, field_id: &str) -> String {
        let sanitized: String = field_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        format!("{}{}", self.variable_prefix, sanitized)
    }
}
