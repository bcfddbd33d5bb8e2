//! Schema-driven data cleanup.
//!
//! The [`Sanitizer`] walks data the same way the validator does but produces
//! a cleaned copy instead of errors: scalar leaves are coerced to the
//! declared kind when the conversion is unambiguous, strings are trimmed and
//! undeclared entries are dropped. Values that cannot be coerced are left as
//! they are, for the validator to report.

use crate::registry::Registry;
use crate::rule::UNKNOWN_ALLOWED;
use schemata_core::{Children, Kind, Result, SanitizeOptions, SchemaNode};
use serde_json::{Map, Number, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Cleans data according to one parsed schema.
///
/// # Example
///
/// ```rust
/// use schemata_core::SanitizeOptions;
/// use schemata_validator::{Registry, Sanitizer};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let sanitizer = Sanitizer::new(
///     Arc::new(Registry::new()),
///     &json!({"type": "map", "schema": {"age": {"type": "integer"}, "name": {"type": "string"}}}),
/// )
/// .unwrap();
///
/// let clean = sanitizer
///     .sanitize(&json!({"age": " 42 ", "name": "  Ada ", "debug": true}), &SanitizeOptions::new())
///     .unwrap();
///
/// assert_eq!(clean, json!({"age": 42, "name": "Ada"}));
/// ```
#[derive(Clone)]
pub struct Sanitizer {
    schema: Arc<SchemaNode>,
    registry: Arc<Registry>,
}

impl Sanitizer {
    /// Parses `description` and creates a sanitizer for it.
    pub fn new(registry: Arc<Registry>, description: &Value) -> Result<Self> {
        let schema = registry.parse(description)?;
        Ok(Self::from_node(registry, schema))
    }

    /// Creates a sanitizer for an already parsed schema.
    pub fn from_node(registry: Arc<Registry>, schema: SchemaNode) -> Self {
        Self {
            schema: Arc::new(schema),
            registry,
        }
    }

    /// The parsed schema.
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Returns a cleaned copy of `data`.
    pub fn sanitize(&self, data: &Value, options: &SanitizeOptions) -> Result<Value> {
        let mut purged = 0;
        let clean = self.sanitize_node(&self.schema, data, options, 0, &mut purged)?;
        debug!(purged, "sanitization finished");
        Ok(clean)
    }

    fn sanitize_node(
        &self,
        node: &Arc<SchemaNode>,
        value: &Value,
        options: &SanitizeOptions,
        depth: usize,
        purged: &mut usize,
    ) -> Result<Value> {
        if depth > options.max_depth {
            debug!(depth, max_depth = options.max_depth, "maximum depth reached, copying subtree");
            return Ok(value.clone());
        }

        let node = self.registry.resolve(node)?;
        let keep_unknown =
            !options.purge_unknown || node.rule(UNKNOWN_ALLOWED).and_then(|spec| spec.flag()) == Some(true);

        match (node.children(), value) {
            (Children::Fields(_), Value::Object(map)) => {
                let mut clean = Map::with_capacity(map.len());
                for (key, item) in map {
                    match node.children().field(key) {
                        Some(child) => {
                            clean.insert(key.clone(), self.sanitize_node(child, item, options, depth + 1, purged)?);
                        }
                        None if keep_unknown => {
                            clean.insert(key.clone(), item.clone());
                        }
                        None => {
                            trace!(key = %key, "dropping undeclared key");
                            *purged += 1;
                        }
                    }
                }
                Ok(Value::Object(clean))
            }
            (Children::Item(child), Value::Array(items)) => items
                .iter()
                .map(|item| self.sanitize_node(child, item, options, depth + 1, purged))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (Children::Elements(elements), Value::Array(items)) => {
                let mut clean = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match elements.get(index) {
                        Some(child) => clean.push(self.sanitize_node(child, item, options, depth + 1, purged)?),
                        None if keep_unknown => clean.push(item.clone()),
                        None => *purged += 1,
                    }
                }
                Ok(Value::Array(clean))
            }
            _ => Ok(coerce(node.kind(), value, options)),
        }
    }
}

/// Coerces a scalar to `kind`, returning it unchanged when that is not possible.
pub fn coerce(kind: &Kind, value: &Value, options: &SanitizeOptions) -> Value {
    let coerced = match (kind, value) {
        (_, Value::Null) => None,
        (Kind::String, Value::String(s)) if options.trim_strings => Some(Value::String(s.trim().to_string())),
        (Kind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (Kind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (Kind::Integer, Value::String(s)) => parse_integer(s.trim()),
        (Kind::Integer, Value::Number(n)) if n.is_f64() => n.as_f64().and_then(integral_float),
        (Kind::Float, Value::String(s)) => parse_float(s.trim()),
        (Kind::Float, Value::Number(n)) if !n.is_f64() => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        (Kind::Numeric, Value::String(s)) => parse_integer(s.trim()).or_else(|| parse_float(s.trim())),
        (Kind::Boolean, Value::String(s)) => parse_bool(s.trim()),
        (Kind::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        _ => None,
    };
    coerced.unwrap_or_else(|| value.clone())
}

fn parse_integer(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    text.parse::<u64>().ok().map(Value::from)
}

fn parse_float(text: &str) -> Option<Value> {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn integral_float(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn parse_bool(text: &str) -> Option<Value> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
        "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sanitizer(description: Value) -> Sanitizer {
        Sanitizer::new(Arc::new(Registry::new()), &description).unwrap()
    }

    #[test]
    fn test_scalar_coercions() {
        let options = SanitizeOptions::new();
        assert_eq!(coerce(&Kind::Integer, &json!(" 12 "), &options), json!(12));
        assert_eq!(coerce(&Kind::Integer, &json!(3.0), &options), json!(3));
        assert_eq!(coerce(&Kind::Integer, &json!(3.5), &options), json!(3.5));
        assert_eq!(coerce(&Kind::Integer, &json!("twelve"), &options), json!("twelve"));
        assert_eq!(coerce(&Kind::Float, &json!("2.5"), &options), json!(2.5));
        assert_eq!(coerce(&Kind::Float, &json!(2), &options), json!(2.0));
        assert_eq!(coerce(&Kind::Numeric, &json!("7"), &options), json!(7));
        assert_eq!(coerce(&Kind::Numeric, &json!("7.25"), &options), json!(7.25));
        assert_eq!(coerce(&Kind::String, &json!(42), &options), json!("42"));
        assert_eq!(coerce(&Kind::String, &json!(false), &options), json!("false"));
        assert_eq!(coerce(&Kind::Boolean, &json!("Yes"), &options), json!(true));
        assert_eq!(coerce(&Kind::Boolean, &json!("off"), &options), json!(false));
        assert_eq!(coerce(&Kind::Boolean, &json!(1), &options), json!(true));
        assert_eq!(coerce(&Kind::Boolean, &json!(2), &options), json!(2));
        assert_eq!(coerce(&Kind::Integer, &Value::Null, &options), Value::Null);
    }

    #[test]
    fn test_integer_coercion_stays_in_range() {
        let options = SanitizeOptions::new();
        let two_pow_63 = json!(9_223_372_036_854_775_808.0_f64);
        assert_eq!(coerce(&Kind::Integer, &two_pow_63, &options), two_pow_63);
        assert_eq!(coerce(&Kind::Integer, &json!(-9_223_372_036_854_775_808.0_f64), &options), json!(i64::MIN));
        assert_eq!(coerce(&Kind::Integer, &json!(1e15), &options), json!(1_000_000_000_000_000_i64));
    }

    #[test]
    fn test_trim_is_optional() {
        let keep = SanitizeOptions::new().with_trim_strings(false);
        assert_eq!(coerce(&Kind::String, &json!("  a "), &keep), json!("  a "));
        assert_eq!(coerce(&Kind::String, &json!("  a "), &SanitizeOptions::new()), json!("a"));
    }

    #[test]
    fn test_purge_unknown() {
        let s = sanitizer(json!({
            "type": "map",
            "schema": {
                "id": {"type": "integer"},
                "point": {"type": "tuple", "schema": [{"type": "float"}, {"type": "float"}]}
            }
        }));
        let data = json!({"id": "5", "extra": 1, "point": [1, "2.5", 9]});

        let clean = s.sanitize(&data, &SanitizeOptions::new()).unwrap();
        assert_eq!(clean, json!({"id": 5, "point": [1.0, 2.5]}));

        let kept = s
            .sanitize(&data, &SanitizeOptions::new().with_purge_unknown(false))
            .unwrap();
        assert_eq!(kept, json!({"id": 5, "extra": 1, "point": [1.0, 2.5, 9]}));
    }

    #[test]
    fn test_unknown_allowed_node_keeps_extra_keys() {
        let s = sanitizer(json!({
            "type": "map",
            "unknownAllowed": true,
            "schema": {"id": {"type": "integer"}}
        }));
        let clean = s.sanitize(&json!({"id": "1", "note": " x "}), &SanitizeOptions::new()).unwrap();
        assert_eq!(clean, json!({"id": 1, "note": " x "}));
    }

    #[test]
    fn test_list_and_named_types() {
        let registry = Arc::new(Registry::new());
        registry
            .register_type(
                "Person",
                &json!({
                    "type": "map",
                    "schema": {
                        "age": {"type": "integer"},
                        "friends": {"type": "list", "schema": {"type": "Person"}}
                    }
                }),
            )
            .unwrap();
        let s = Sanitizer::new(registry, &json!({"type": "Person"})).unwrap();

        let clean = s
            .sanitize(
                &json!({"age": "40", "friends": [{"age": "7", "friends": []}]}),
                &SanitizeOptions::new(),
            )
            .unwrap();
        assert_eq!(clean, json!({"age": 40, "friends": [{"age": 7, "friends": []}]}));
    }

    #[test]
    fn test_max_depth_copies_deep_subtree() {
        let registry = Arc::new(Registry::new());
        registry
            .register_type(
                "Node",
                &json!({"type": "map", "schema": {"n": {"type": "integer"}, "child": {"type": "Node"}}}),
            )
            .unwrap();
        let s = Sanitizer::new(registry, &json!({"type": "Node"})).unwrap();

        let data = json!({"n": "1", "child": {"n": "2", "child": {"n": "3", "x": 0}}});
        let clean = s
            .sanitize(&data, &SanitizeOptions::new().with_max_depth(1))
            .unwrap();
        assert_eq!(clean, json!({"n": 1, "child": {"n": "2", "child": {"n": "3", "x": 0}}}));

        let mut deep = json!({});
        for _ in 0..1000 {
            deep = json!({"child": deep});
        }
        let clean = s.sanitize(&deep, &SanitizeOptions::new()).unwrap();
        let mut depth = 0;
        let mut cursor = &clean;
        while let Some(next) = cursor.get("child") {
            depth += 1;
            cursor = next;
        }
        assert_eq!(depth, 1000);
    }

    #[test]
    fn test_mismatched_shape_left_alone() {
        let s = sanitizer(json!({"type": "list", "schema": {"type": "integer"}}));
        let clean = s.sanitize(&json!({"a": "1"}), &SanitizeOptions::new()).unwrap();
        assert_eq!(clean, json!({"a": "1"}));
    }
}
