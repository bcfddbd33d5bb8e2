//! Builder for schema descriptions.
//!
//! Schemas are usually loaded from documents, but building them in code is
//! common in tests and when schemas are assembled programmatically. The
//! builder produces the same raw description a YAML file would, so the result
//! still goes through the parser.

use crate::kind::Kind;
use serde_json::{Map, Value};

/// Builder for one schema description node.
///
/// # Example
///
/// ```rust
/// use schemata_core::SchemaBuilder;
/// use serde_json::json;
///
/// let description = SchemaBuilder::list(SchemaBuilder::integer().rule("min", 1))
///     .rule("maxlength", 3)
///     .build();
///
/// assert_eq!(
///     description,
///     json!({"type": "list", "maxlength": 3, "schema": {"type": "integer", "min": 1}})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    rules: Map<String, Value>,
    additions: Vec<Value>,
    schema: Option<Value>,
}

impl SchemaBuilder {
    /// Creates a builder for a node of the given type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        let mut rules = Map::new();
        rules.insert("type".to_string(), Value::String(type_name.into()));
        Self {
            rules,
            additions: Vec::new(),
            schema: None,
        }
    }

    /// A `boolean` node.
    pub fn boolean() -> Self {
        Self::new(Kind::Boolean.name())
    }

    /// An `integer` node.
    pub fn integer() -> Self {
        Self::new(Kind::Integer.name())
    }

    /// A `float` node.
    pub fn float() -> Self {
        Self::new(Kind::Float.name())
    }

    /// A `numeric` node.
    pub fn numeric() -> Self {
        Self::new(Kind::Numeric.name())
    }

    /// A `string` node.
    pub fn string() -> Self {
        Self::new(Kind::String.name())
    }

    /// A `map` node; add fields with [`field`](Self::field).
    pub fn map() -> Self {
        let mut builder = Self::new(Kind::Map.name());
        builder.schema = Some(Value::Object(Map::new()));
        builder
    }

    /// A `list` node with the given item schema.
    pub fn list(item: SchemaBuilder) -> Self {
        let mut builder = Self::new(Kind::List.name());
        builder.schema = Some(item.build());
        builder
    }

    /// A `tuple` node; add positions with [`element`](Self::element).
    pub fn tuple() -> Self {
        let mut builder = Self::new(Kind::Tuple.name());
        builder.schema = Some(Value::Array(Vec::new()));
        builder
    }

    /// Sets a plain `rule: args` entry.
    pub fn rule(mut self, id: impl Into<String>, args: impl Into<Value>) -> Self {
        self.rules.insert(id.into(), args.into());
        self
    }

    /// Adds a rule with a custom message, using the `rules` list syntax.
    pub fn rule_with_message(
        mut self,
        id: impl Into<String>,
        args: impl Into<Value>,
        message: impl Into<String>,
    ) -> Self {
        let mut entry = Map::new();
        entry.insert(id.into(), args.into());
        entry.insert("message".to_string(), Value::String(message.into()));
        self.additions.push(Value::Object(entry));
        self
    }

    /// Sets `required`.
    pub fn required(self, required: bool) -> Self {
        self.rule("required", required)
    }

    /// Sets `nullable`.
    pub fn nullable(self, nullable: bool) -> Self {
        self.rule("nullable", nullable)
    }

    /// Sets `blankable`.
    pub fn blankable(self, blankable: bool) -> Self {
        self.rule("blankable", blankable)
    }

    /// Sets `unknownAllowed`.
    pub fn unknown_allowed(self, allowed: bool) -> Self {
        self.rule("unknownAllowed", allowed)
    }

    /// Adds a field to a `map` node.
    pub fn field(mut self, name: impl Into<String>, schema: SchemaBuilder) -> Self {
        let fields = self
            .schema
            .get_or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(fields) = fields {
            fields.insert(name.into(), schema.build());
        }
        self
    }

    /// Appends a position to a `tuple` node.
    pub fn element(mut self, schema: SchemaBuilder) -> Self {
        let elements = self
            .schema
            .get_or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(elements) = elements {
            elements.push(schema.build());
        }
        self
    }

    /// Builds the raw description.
    pub fn build(self) -> Value {
        let mut description = self.rules;
        if !self.additions.is_empty() {
            description.insert("rules".to_string(), Value::Array(self.additions));
        }
        if let Some(schema) = self.schema {
            description.insert("schema".to_string(), schema);
        }
        Value::Object(description)
    }
}

impl From<SchemaBuilder> for Value {
    fn from(builder: SchemaBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_map_builder() {
        let description = SchemaBuilder::map()
            .required(true)
            .field("name", SchemaBuilder::string().blankable(false))
            .field("age", SchemaBuilder::integer().rule("min", 0))
            .build();

        assert_eq!(
            description,
            json!({
                "type": "map",
                "required": true,
                "schema": {
                    "name": {"type": "string", "blankable": false},
                    "age": {"type": "integer", "min": 0}
                }
            })
        );
    }

    #[test]
    fn test_tuple_builder() {
        let description = SchemaBuilder::tuple()
            .element(SchemaBuilder::integer())
            .element(SchemaBuilder::string())
            .build();

        assert_eq!(
            description,
            json!({"type": "tuple", "schema": [{"type": "integer"}, {"type": "string"}]})
        );
    }

    #[test]
    fn test_rule_with_message_uses_rules_list() {
        let description = SchemaBuilder::string()
            .rule_with_message("regex", "^[a-z]+$", "lowercase letters only")
            .build();

        assert_eq!(
            description["rules"],
            json!([{"regex": "^[a-z]+$", "message": "lowercase letters only"}])
        );
    }

    #[test]
    fn test_named_type() {
        let description = SchemaBuilder::new("Person").nullable(true).build();
        assert_eq!(description, json!({"type": "Person", "nullable": true}));
    }
}
