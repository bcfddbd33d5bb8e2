//! # Schemata SDK
//!
//! Public API for schemata. Re-exports the types needed to describe schemas,
//! validate and sanitize data, and adds one-call helpers backed by a shared
//! process-wide [`Registry`].
//!
//! Applications that need isolated registries (tests, multi-tenant services)
//! should build their own [`Registry`] and hand it to [`Validator::new`]; the
//! shared registry is only a convenience for simple programs.
//!
//! ## Example
//!
//! ```rust
//! use schemata_sdk::{ValidationOptions, validate};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "map",
//!     "schema": {
//!         "email": {"type": "string", "required": true, "email": true},
//!         "age": {"type": "integer", "min": 18}
//!     }
//! });
//!
//! let report = validate(&schema, &json!({"age": 12}), &ValidationOptions::new()).unwrap();
//!
//! assert!(!report.passed);
//! assert_eq!(report.codes(), vec!["required", "min"]);
//! ```

use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::debug;

pub use schemata_core::{
    Children, JsonApiError, Kind, NestedErrors, PathSegment, RuleSpec, SanitizeOptions, SchemaBuilder,
    SchemaDefect, SchemaError, SchemaNode, ValidationError, ValidationOptions, ValidationReport,
    ValidationStats,
};
pub use schemata_parser::{DocumentFormat, ParserError, parse_file, parse_json, parse_toml, parse_yaml};
pub use schemata_validator::{
    Registry, Rule, RuleContext, RuleRegistry, Sanitizer, TypeCatalog, ValidationContext, Validator,
    flag_arg, length_arg, number_arg, string_arg,
};

/// Errors from the file-based helpers.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A document could not be loaded
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// The schema is invalid or could not be applied
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

static DEFAULT_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// The shared registry used by the helpers in this crate.
pub fn default_registry() -> Arc<Registry> {
    Arc::clone(DEFAULT_REGISTRY.get_or_init(|| {
        debug!("initializing default registry");
        Arc::new(Registry::new())
    }))
}

/// Registers a named type in the shared registry.
pub fn register_type(name: &str, description: &Value) -> schemata_core::Result<()> {
    default_registry().register_type(name, description)
}

/// Registers several named types at once in the shared registry.
///
/// Types in the batch may refer to each other.
pub fn register_types(descriptions: &Value) -> schemata_core::Result<()> {
    default_registry().register_types(descriptions)
}

/// Registers a custom rule in the shared registry.
pub fn register_rule(id: impl Into<String>, rule: Arc<dyn Rule>) {
    default_registry().register_rule(id, rule)
}

/// Validates `data` against `description` using the shared registry.
pub fn validate(
    description: &Value,
    data: &Value,
    options: &ValidationOptions,
) -> schemata_core::Result<ValidationReport> {
    Validator::new(default_registry(), description)?.validate(data, options)
}

/// Sanitizes `data` according to `description` using the shared registry.
pub fn sanitize(
    description: &Value,
    data: &Value,
    options: &SanitizeOptions,
) -> schemata_core::Result<Value> {
    Sanitizer::new(default_registry(), description)?.sanitize(data, options)
}

/// Loads a schema and a data document from disk and validates one against
/// the other.
pub fn validate_file(
    schema_path: &Path,
    data_path: &Path,
    options: &ValidationOptions,
) -> Result<ValidationReport, SdkError> {
    let description = parse_file(schema_path)?;
    let data = parse_file(data_path)?;
    Ok(validate(&description, &data, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_registry_is_shared() {
        assert!(Arc::ptr_eq(&default_registry(), &default_registry()));
    }

    #[test]
    fn test_registered_type_visible_to_helpers() {
        register_type("SdkUnitPoint", &json!({"type": "tuple", "schema": [{"type": "float"}, {"type": "float"}]}))
            .unwrap();

        let report = validate(
            &json!({"type": "SdkUnitPoint"}),
            &json!([1.5, "north"]),
            &ValidationOptions::new(),
        )
        .unwrap();
        assert_eq!(report.codes(), vec!["type"]);
        assert_eq!(report.errors[0].pointer(), "/1");
    }

    #[test]
    fn test_invalid_schema_is_a_hard_error() {
        let err = validate(&json!({"schema": {}}), &json!({}), &ValidationOptions::new()).unwrap_err();
        assert_eq!(err.defect(), Some(&SchemaDefect::TypeMissing));
    }
}
