//! Error types.
//!
//! Two very different things can go wrong:
//!
//! - the *schema* (or the way it is used) is broken: a malformed description,
//!   an unknown rule or type, bad rule arguments. These are [`SchemaError`]s,
//!   returned as `Err` and meant to be fixed by whoever wrote the schema.
//! - the *data* does not match the schema. These are [`ValidationError`]
//!   records collected during a validation pass and never returned as `Err`.

use crate::path::{PathSegment, to_pointer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Hard failures raised while building or applying a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The schema description is malformed
    #[error("Invalid schema at '{path}': {defect}")]
    InvalidSchema {
        /// JSON pointer into the schema description
        path: String,
        /// What is wrong at that location
        defect: SchemaDefect,
    },

    /// A named type would shadow a built-in kind
    #[error("Type '{0}' collides with a built-in kind")]
    DuplicateBuiltinType(String),

    /// A named type is not registered
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A rule id is not registered
    #[error("Unknown validation rule '{0}'")]
    UnknownValidationRuleId(String),

    /// A rule was used on a kind it does not support
    #[error("Rule '{rule}' cannot be applied to kind '{kind}'")]
    InapplicableValidationRule {
        /// Rule id
        rule: String,
        /// Kind of the node the rule was declared on
        kind: String,
    },

    /// A rule's configured arguments are unusable
    #[error("Invalid arguments for rule '{rule}': {reason}")]
    InvalidRuleArgs {
        /// Rule id
        rule: String,
        /// Why the arguments were rejected
        reason: String,
    },

    /// Named types alias each other without any structure in between
    #[error("Named type '{0}' expands to itself")]
    CyclicTypeAlias(String),

    /// Options map could not be read
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl SchemaError {
    /// Creates an invalid schema error at the given description path.
    pub fn invalid(path: &[PathSegment], defect: SchemaDefect) -> Self {
        Self::InvalidSchema {
            path: to_pointer(path),
            defect,
        }
    }

    /// Creates an invalid rule arguments error.
    pub fn rule_args(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRuleArgs {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Returns the parse defect, if this is an invalid schema error.
    pub fn defect(&self) -> Option<&SchemaDefect> {
        match self {
            Self::InvalidSchema { defect, .. } => Some(defect),
            _ => None,
        }
    }
}

/// Structural problems found while parsing a schema description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefect {
    /// A value has the wrong shape
    #[error("expected {expected}, found {found}")]
    ValueTypeMismatch {
        /// Expected shape
        expected: &'static str,
        /// Shape actually found
        found: &'static str,
    },

    /// No `type` rule
    #[error("type is missing")]
    TypeMissing,

    /// More than one `type` rule
    #[error("type is declared more than once")]
    TypeRepeated,

    /// `type` names neither a built-in kind nor a registered type
    #[error("unknown type '{0}'")]
    TypeUnknown(String),

    /// A key is not a registered rule
    #[error("unknown rule '{0}'")]
    RuleIdUnknown(String),

    /// A rule entry holds only `message`/`meta`
    #[error("rule entry declares no rule")]
    RuleMissing,

    /// A rule entry holds several rules
    #[error("rule entry declares several rules: {}", .0.join(", "))]
    RuleAmbiguous(Vec<String>),

    /// A compound kind has no `schema` key
    #[error("'schema' is required for kind '{0}'")]
    SchemaMissing(String),

    /// A non-compound kind has a `schema` key
    #[error("'schema' is not allowed for kind '{0}'")]
    SchemaUnexpected(String),

    /// `message` is not a string
    #[error("message must be a string")]
    MessageNotString,

    /// `meta` is not a map
    #[error("meta must be a map")]
    MetaNotMap,
}

/// One problem found in the data being validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path from the document root to the offending value
    pub source: Vec<PathSegment>,

    /// Id of the rule that raised it
    pub code: String,

    /// Rendered message
    pub message: String,

    /// Metadata from the rule configuration or the rule itself
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl ValidationError {
    /// Creates a new error record without metadata.
    pub fn new(
        source: Vec<PathSegment>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            code: code.into(),
            message: message.into(),
            meta: Map::new(),
        }
    }

    /// Attaches metadata.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }

    /// The source path as a JSON pointer.
    pub fn pointer(&self) -> String {
        to_pointer(&self.source)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = self.pointer();
        let location = if pointer.is_empty() { "/" } else { &pointer };
        write!(f, "{location}: {} ({})", self.message, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_schema_message_has_pointer() {
        let path = vec![PathSegment::root(), "schema".into(), "age".into()];
        let err = SchemaError::invalid(&path, SchemaDefect::TypeMissing);
        assert_eq!(
            err.to_string(),
            "Invalid schema at '/schema/age': type is missing"
        );
        assert_eq!(err.defect(), Some(&SchemaDefect::TypeMissing));
    }

    #[test]
    fn test_ambiguous_lists_rules() {
        let defect = SchemaDefect::RuleAmbiguous(vec!["min".into(), "max".into()]);
        assert_eq!(defect.to_string(), "rule entry declares several rules: min, max");
    }

    #[test]
    fn test_display_validation_error() {
        let err = ValidationError::new(
            vec![PathSegment::root(), "meta".into(), "age".into()],
            "required",
            "is required",
        );
        assert_eq!(err.to_string(), "/meta/age: is required (required)");

        let root = ValidationError::new(vec![PathSegment::root()], "nullable", "cannot be null");
        assert_eq!(root.to_string(), "/: cannot be null (nullable)");
    }

    #[test]
    fn test_meta_skipped_when_empty() {
        let err = ValidationError::new(vec![PathSegment::root()], "type", "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("meta").is_none());
    }
}
