#![deny(missing_docs)]

//! # Compiler Options
//!
//! Knobs that change what the compiler emits. Loaded from a YAML file with kebab-case
//! keys; every key is optional.
//!
//! ```yaml
//! include-tags: [pets]
//! exclude-schemas: [Error]
//! import-mapping:
//!   common.yaml: common_types
//! response-type-suffix: Resp
//! ```

use crate::error::AppResult;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default suffix appended to synthesized response type names.
pub const DEFAULT_RESPONSE_TYPE_SUFFIX: &str = "Response";

/// Options controlling a single compilation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerOptions {
    /// Only operations carrying at least one of these tags are compiled.
    pub include_tags: Vec<String>,
    /// Operations carrying any of these tags are skipped.
    pub exclude_tags: Vec<String>,
    /// Component schemas that are declared elsewhere; they can be referenced but are
    /// not emitted.
    pub exclude_schemas: Vec<String>,
    /// External document → module path used to qualify cross-document references.
    pub import_mapping: BTreeMap<String, String>,
    /// Suffix for response type names.
    pub response_type_suffix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            exclude_schemas: Vec::new(),
            import_mapping: BTreeMap::new(),
            response_type_suffix: DEFAULT_RESPONSE_TYPE_SUFFIX.to_string(),
        }
    }
}

impl CompilerOptions {
    /// Parses options from YAML text.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses an options file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Whether an operation with these tags survives the include/exclude filters.
    pub fn accepts_tags(&self, tags: &[String]) -> bool {
        if !self.include_tags.is_empty() && !tags.iter().any(|t| self.include_tags.contains(t)) {
            return false;
        }
        !tags.iter().any(|t| self.exclude_tags.contains(t))
    }

    /// Whether a component schema is declared externally.
    pub fn is_schema_excluded(&self, name: &str) -> bool {
        self.exclude_schemas.iter().any(|s| s == name)
    }
}
