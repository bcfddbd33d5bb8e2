//! Per-call options for validation and sanitization.
//!
//! Both option sets deserialize from a flat camelCase map, so they can be
//! loaded straight from a YAML/TOML/JSON document:
//!
//! ```rust
//! use schemata_core::ValidationOptions;
//! use serde_json::json;
//!
//! let options = ValidationOptions::from_value(&json!({"allRequired": true})).unwrap();
//! assert!(options.all_required);
//! assert!(!options.all_nullable);
//! ```

use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default limit on how deep validation and sanitization descend into data.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for a validation pass.
///
/// Each `all_*` flag is the default argument of the built-in rule with the
/// matching name, used at every node that does not configure that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// Default for `unknownAllowed`
    pub all_unknown_allowed: bool,

    /// Default for `blankable`
    pub all_blankable: bool,

    /// Default for `nullable`
    pub all_nullable: bool,

    /// Default for `required`
    pub all_required: bool,

    /// Maximum nesting depth of the data
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            all_unknown_allowed: false,
            all_blankable: false,
            all_nullable: false,
            all_required: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidationOptions {
    /// Creates options with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from a flat map.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| SchemaError::InvalidOptions(e.to_string()))
    }

    /// Sets the default for `unknownAllowed`.
    pub fn with_all_unknown_allowed(mut self, allowed: bool) -> Self {
        self.all_unknown_allowed = allowed;
        self
    }

    /// Sets the default for `blankable`.
    pub fn with_all_blankable(mut self, blankable: bool) -> Self {
        self.all_blankable = blankable;
        self
    }

    /// Sets the default for `nullable`.
    pub fn with_all_nullable(mut self, nullable: bool) -> Self {
        self.all_nullable = nullable;
        self
    }

    /// Sets the default for `required`.
    pub fn with_all_required(mut self, required: bool) -> Self {
        self.all_required = required;
        self
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The default argument for a built-in flag rule, if the options cover it.
    pub fn default_for(&self, rule: &str) -> Option<bool> {
        match rule {
            "required" => Some(self.all_required),
            "unknownAllowed" => Some(self.all_unknown_allowed),
            "nullable" => Some(self.all_nullable),
            "blankable" => Some(self.all_blankable),
            _ => None,
        }
    }
}

/// Options for a sanitization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SanitizeOptions {
    /// Trim surrounding whitespace from string values
    pub trim_strings: bool,

    /// Drop map keys and tuple elements the schema does not declare
    pub purge_unknown: bool,

    /// Maximum nesting depth; deeper values are copied unchanged
    pub max_depth: usize,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            trim_strings: true,
            purge_unknown: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SanitizeOptions {
    /// Creates options with the defaults (trim and purge).
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from a flat map.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| SchemaError::InvalidOptions(e.to_string()))
    }

    /// Sets string trimming.
    pub fn with_trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }

    /// Sets purging of undeclared keys.
    pub fn with_purge_unknown(mut self, purge: bool) -> Self {
        self.purge_unknown = purge;
        self
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
