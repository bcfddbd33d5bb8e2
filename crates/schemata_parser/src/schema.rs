//! Schema description parser.
//!
//! Turns a raw description into a [`SchemaNode`] tree, one node at a time:
//!
//! 1. the description must be a map
//! 2. exactly one `type` must be declared, either as a plain key or inside a
//!    `rules` entry, and it must name a known kind
//! 3. every other key is a rule id that the [`Vocabulary`] knows
//! 4. `list`, `map` and `tuple` nodes carry a `schema` key, which is parsed
//!    recursively
//!
//! Named types are not expanded here. A reference to a named type only has to
//! be known to the vocabulary, which is what lets a type refer to itself.

use schemata_core::{
    Children, Kind, PathSegment, Result, RuleSpec, SchemaDefect, SchemaError, SchemaNode,
    TYPE_RULE, describe,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Key holding the child schemas of compound kinds.
pub const SCHEMA_KEY: &str = "schema";

/// Key holding the list of rules with additions.
pub const RULES_KEY: &str = "rules";

/// Keys allowed next to the rule in a `rules` entry.
pub const ADDITION_KEYS: [&str; 2] = ["message", "meta"];

/// The names a schema may refer to.
///
/// Built-in kinds are always known; the vocabulary answers for rule ids and
/// named types.
pub trait Vocabulary {
    /// Returns true if `id` is a registered rule.
    fn has_rule(&self, id: &str) -> bool;

    /// Returns true if `name` is a registered named type.
    fn has_type(&self, name: &str) -> bool;
}

/// Parser for schema descriptions.
pub struct SchemaParser<'v> {
    vocabulary: &'v dyn Vocabulary,
}

/// A rule read from the description, with the path it was found at.
struct Declared {
    spec: RuleSpec,
    path: Vec<PathSegment>,
}

impl<'v> SchemaParser<'v> {
    /// Creates a parser that checks names against `vocabulary`.
    pub fn new(vocabulary: &'v dyn Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Parses a full schema description.
    pub fn parse(&self, description: &Value) -> Result<SchemaNode> {
        let mut path = vec![PathSegment::root()];
        self.parse_node(description, &mut path)
    }

    fn parse_node(&self, description: &Value, path: &mut Vec<PathSegment>) -> Result<SchemaNode> {
        let object = expect_map(description, path)?;

        let mut declared = Vec::new();
        let mut schema = None;
        for (key, value) in object {
            match key.as_str() {
                SCHEMA_KEY => schema = Some(value),
                RULES_KEY => {
                    path.push(key.into());
                    let additions = self.parse_additions(value, path);
                    path.pop();
                    declared.extend(additions?);
                }
                _ => {
                    let mut rule_path = path.clone();
                    rule_path.push(key.into());
                    declared.push(Declared {
                        spec: RuleSpec::new(key.clone(), value.clone()),
                        path: rule_path,
                    });
                }
            }
        }

        let kind = self.resolve_kind(&declared, path)?;

        for rule in &declared {
            if rule.spec.id != TYPE_RULE && !self.vocabulary.has_rule(&rule.spec.id) {
                return Err(SchemaError::invalid(
                    &rule.path,
                    SchemaDefect::RuleIdUnknown(rule.spec.id.clone()),
                ));
            }
        }

        let mut node = SchemaNode::new(kind.clone());
        for rule in declared {
            node.insert_rule(rule.spec);
        }

        let children = match schema {
            Some(schema) => {
                path.push(SCHEMA_KEY.into());
                let children = self.parse_children(&kind, schema, path);
                path.pop();
                children?
            }
            None if kind.is_compound() => {
                return Err(SchemaError::invalid(
                    path,
                    SchemaDefect::SchemaMissing(kind.name().to_string()),
                ));
            }
            None => Children::None,
        };

        Ok(node.with_children(children))
    }

    /// Reads the `rules` list: each entry holds one rule plus optional additions.
    fn parse_additions(&self, value: &Value, path: &mut Vec<PathSegment>) -> Result<Vec<Declared>> {
        let Value::Array(entries) = value else {
            return Err(mismatch(path, "list", value));
        };

        let mut declared = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            path.push(index.into());
            let rule = parse_addition(entry, path);
            path.pop();
            declared.push(rule?);
        }
        Ok(declared)
    }

    /// Finds the single `type` declaration and resolves it to a kind.
    fn resolve_kind(&self, declared: &[Declared], path: &[PathSegment]) -> Result<Kind> {
        let mut types = declared.iter().filter(|rule| rule.spec.id == TYPE_RULE);
        let declaration = types
            .next()
            .ok_or_else(|| SchemaError::invalid(path, SchemaDefect::TypeMissing))?;
        if let Some(repeated) = types.next() {
            return Err(SchemaError::invalid(&repeated.path, SchemaDefect::TypeRepeated));
        }

        let Value::String(name) = &declaration.spec.args else {
            return Err(mismatch(&declaration.path, "string", &declaration.spec.args));
        };

        match Kind::builtin(name) {
            Some(kind) => Ok(kind),
            None if self.vocabulary.has_type(name) => Ok(Kind::Named(name.clone())),
            None => Err(SchemaError::invalid(
                &declaration.path,
                SchemaDefect::TypeUnknown(name.clone()),
            )),
        }
    }

    fn parse_children(
        &self,
        kind: &Kind,
        schema: &Value,
        path: &mut Vec<PathSegment>,
    ) -> Result<Children> {
        match kind {
            Kind::List => Ok(Children::Item(Arc::new(self.parse_node(schema, path)?))),
            Kind::Map => {
                let fields = expect_map(schema, path)?;
                let mut parsed = Vec::with_capacity(fields.len());
                for (name, description) in fields {
                    path.push(name.into());
                    let child = self.parse_node(description, path);
                    path.pop();
                    parsed.push((name.clone(), Arc::new(child?)));
                }
                Ok(Children::Fields(parsed))
            }
            Kind::Tuple => {
                let Value::Array(elements) = schema else {
                    return Err(mismatch(path, "list", schema));
                };
                let mut parsed = Vec::with_capacity(elements.len());
                for (index, description) in elements.iter().enumerate() {
                    path.push(index.into());
                    let child = self.parse_node(description, path);
                    path.pop();
                    parsed.push(Arc::new(child?));
                }
                Ok(Children::Elements(parsed))
            }
            other => Err(SchemaError::invalid(
                path,
                SchemaDefect::SchemaUnexpected(other.name().to_string()),
            )),
        }
    }
}

/// Parses a schema description against `vocabulary`.
pub fn parse_schema(description: &Value, vocabulary: &dyn Vocabulary) -> Result<SchemaNode> {
    SchemaParser::new(vocabulary).parse(description)
}

/// Loads a schema description from disk and parses it against `vocabulary`.
///
/// Load failures and schema defects both come back as a
/// [`ParserError`](crate::document::ParserError).
pub fn parse_schema_file(
    path: &Path,
    vocabulary: &dyn Vocabulary,
) -> crate::document::Result<SchemaNode> {
    let description = crate::document::parse_file(path)?;
    Ok(parse_schema(&description, vocabulary)?)
}

fn parse_addition(entry: &Value, path: &[PathSegment]) -> Result<Declared> {
    let object = expect_map(entry, path)?;

    let rule_keys: Vec<&String> = object
        .keys()
        .filter(|key| !ADDITION_KEYS.contains(&key.as_str()))
        .collect();
    let id = match rule_keys.as_slice() {
        [] => return Err(SchemaError::invalid(path, SchemaDefect::RuleMissing)),
        [id] => (*id).clone(),
        many => {
            return Err(SchemaError::invalid(
                path,
                SchemaDefect::RuleAmbiguous(many.iter().map(|key| (*key).clone()).collect()),
            ));
        }
    };

    let mut spec = RuleSpec::new(id.clone(), object[&id].clone());
    if let Some(message) = object.get("message") {
        let Value::String(message) = message else {
            return Err(SchemaError::invalid(
                &child_path(path, "message"),
                SchemaDefect::MessageNotString,
            ));
        };
        spec = spec.with_message(message.clone());
    }
    if let Some(meta) = object.get("meta") {
        let Value::Object(meta) = meta else {
            return Err(SchemaError::invalid(
                &child_path(path, "meta"),
                SchemaDefect::MetaNotMap,
            ));
        };
        spec = spec.with_meta(meta.clone());
    }

    Ok(Declared {
        spec,
        path: child_path(path, &id),
    })
}

fn expect_map<'a>(value: &'a Value, path: &[PathSegment]) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| mismatch(path, "map", value))
}

fn mismatch(path: &[PathSegment], expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::invalid(
        path,
        SchemaDefect::ValueTypeMismatch {
            expected,
            found: describe(found),
        },
    )
}

fn child_path(path: &[PathSegment], key: &str) -> Vec<PathSegment> {
    let mut child = path.to_vec();
    child.push(key.into());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct TestVocabulary;

    impl Vocabulary for TestVocabulary {
        fn has_rule(&self, id: &str) -> bool {
            matches!(
                id,
                "required" | "nullable" | "blankable" | "unknownAllowed" | "min" | "max" | "regex"
            )
        }

        fn has_type(&self, name: &str) -> bool {
            name == "Person"
        }
    }

    fn parse(description: Value) -> Result<SchemaNode> {
        parse_schema(&description, &TestVocabulary)
    }

    fn defect_at(description: Value) -> (String, SchemaDefect) {
        match parse(description).unwrap_err() {
            SchemaError::InvalidSchema { path, defect } => (path, defect),
            other => panic!("expected invalid schema, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_node() {
        let node = parse(json!({"type": "integer", "min": 5, "required": true})).unwrap();
        assert_eq!(node.kind(), &Kind::Integer);
        let ids: Vec<_> = node.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["type", "min", "required"]);
        assert_eq!(node.children(), &Children::None);
    }

    #[test]
    fn test_nested_map_and_list() {
        let node = parse(json!({
            "type": "map",
            "schema": {
                "tags": {"type": "list", "schema": {"type": "string"}},
                "owner": {"type": "Person"}
            }
        }))
        .unwrap();

        let tags = node.children().field("tags").expect("tags field");
        assert_eq!(tags.kind(), &Kind::List);
        let Children::Item(item) = tags.children() else {
            panic!("list without item schema");
        };
        assert_eq!(item.kind(), &Kind::String);

        let owner = node.children().field("owner").unwrap();
        assert_eq!(owner.kind(), &Kind::Named("Person".into()));
    }

    #[test]
    fn test_tuple_elements() {
        let node = parse(json!({
            "type": "tuple",
            "schema": [{"type": "integer"}, {"type": "string"}]
        }))
        .unwrap();

        let Children::Elements(elements) = node.children() else {
            panic!("tuple without elements");
        };
        let kinds: Vec<_> = elements.iter().map(|e| e.kind().clone()).collect();
        assert_eq!(kinds, vec![Kind::Integer, Kind::String]);
    }

    #[test]
    fn test_not_a_map() {
        let (path, defect) = defect_at(json!({"type": "map", "schema": {"name": "string"}}));
        assert_eq!(path, "/schema/name");
        assert_eq!(
            defect,
            SchemaDefect::ValueTypeMismatch {
                expected: "map",
                found: "string"
            }
        );
    }

    #[test]
    fn test_type_missing() {
        let (path, defect) = defect_at(json!({
            "type": "map",
            "schema": {"meta": {"type": "map", "schema": {"age": {"min": 1}}}}
        }));
        assert_eq!(path, "/schema/meta/schema/age");
        assert_eq!(defect, SchemaDefect::TypeMissing);
    }

    #[test]
    fn test_type_repeated_via_rules_list() {
        let (path, defect) = defect_at(json!({
            "type": "string",
            "rules": [{"type": "integer", "message": "number please"}]
        }));
        assert_eq!(path, "/rules/0/type");
        assert_eq!(defect, SchemaDefect::TypeRepeated);
    }

    #[test]
    fn test_type_inside_rules_list() {
        let node = parse(json!({
            "rules": [{"type": "integer", "message": "number please"}]
        }))
        .unwrap();
        assert_eq!(node.kind(), &Kind::Integer);
        assert_eq!(
            node.rule(TYPE_RULE).unwrap().message.as_deref(),
            Some("number please")
        );
    }

    #[test]
    fn test_type_unknown() {
        let (path, defect) = defect_at(json!({"type": "Robot"}));
        assert_eq!(path, "/type");
        assert_eq!(defect, SchemaDefect::TypeUnknown("Robot".into()));
    }

    #[test]
    fn test_type_must_be_string() {
        let (_, defect) = defect_at(json!({"type": 3}));
        assert_eq!(
            defect,
            SchemaDefect::ValueTypeMismatch {
                expected: "string",
                found: "integer"
            }
        );
    }

    #[test]
    fn test_rule_unknown() {
        let (path, defect) = defect_at(json!({"type": "string", "minlenght": 3}));
        assert_eq!(path, "/minlenght");
        assert_eq!(defect, SchemaDefect::RuleIdUnknown("minlenght".into()));
    }

    #[test]
    fn test_schema_missing() {
        let (path, defect) = defect_at(json!({"type": "map", "schema": {"items": {"type": "list"}}}));
        assert_eq!(path, "/schema/items");
        assert_eq!(defect, SchemaDefect::SchemaMissing("list".into()));

        let (_, defect) = defect_at(json!({"type": "tuple"}));
        assert_eq!(defect, SchemaDefect::SchemaMissing("tuple".into()));
    }

    #[test]
    fn test_schema_unexpected() {
        let (path, defect) = defect_at(json!({"type": "string", "schema": {"type": "string"}}));
        assert_eq!(path, "/schema");
        assert_eq!(defect, SchemaDefect::SchemaUnexpected("string".into()));
    }

    #[test]
    fn test_rule_with_additions() {
        let node = parse(json!({
            "type": "string",
            "rules": [
                {"regex": "^[a-z]+$", "message": "lowercase only", "meta": {"hint": "a-z"}}
            ]
        }))
        .unwrap();

        let regex = node.rule("regex").unwrap();
        assert_eq!(regex.args, json!("^[a-z]+$"));
        assert_eq!(regex.message.as_deref(), Some("lowercase only"));
        assert_eq!(regex.meta.as_ref().unwrap()["hint"], json!("a-z"));
    }

    #[test]
    fn test_rule_missing_and_ambiguous() {
        let (path, defect) = defect_at(json!({"type": "string", "rules": [{"message": "x"}]}));
        assert_eq!(path, "/rules/0");
        assert_eq!(defect, SchemaDefect::RuleMissing);

        let (_, defect) = defect_at(json!({
            "type": "integer",
            "rules": [{"min": 1, "max": 3, "message": "x"}]
        }));
        assert_eq!(
            defect,
            SchemaDefect::RuleAmbiguous(vec!["min".into(), "max".into()])
        );
    }

    #[test]
    fn test_bad_additions() {
        let (path, defect) = defect_at(json!({"type": "integer", "rules": [{"min": 1, "message": 5}]}));
        assert_eq!(path, "/rules/0/message");
        assert_eq!(defect, SchemaDefect::MessageNotString);

        let (_, defect) = defect_at(json!({"type": "integer", "rules": [{"min": 1, "meta": []}]}));
        assert_eq!(defect, SchemaDefect::MetaNotMap);

        let (_, defect) = defect_at(json!({"type": "integer", "rules": {"min": 1}}));
        assert_eq!(
            defect,
            SchemaDefect::ValueTypeMismatch {
                expected: "list",
                found: "map"
            }
        );
    }

    #[test]
    fn test_unknown_rule_in_additions() {
        let (path, defect) = defect_at(json!({"type": "integer", "rules": [{"between": [1, 2]}]}));
        assert_eq!(path, "/rules/0/between");
        assert_eq!(defect, SchemaDefect::RuleIdUnknown("between".into()));
    }

    #[test]
    fn test_field_order_preserved() {
        let node = parse(json!({
            "type": "map",
            "schema": {"b": {"type": "string"}, "a": {"type": "string"}, "c": {"type": "string"}}
        }))
        .unwrap();
        let Children::Fields(fields) = node.children() else {
            panic!("map without fields");
        };
        let names: Vec<_> = fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
