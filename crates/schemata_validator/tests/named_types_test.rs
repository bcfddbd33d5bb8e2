//! Named types, custom rules and registry behavior seen from the outside.

use pretty_assertions::assert_eq;
use schemata_core::{Kind, SchemaError, ValidationOptions, ValidationReport};
use schemata_validator::{Registry, Rule, RuleContext, Sanitizer, Validator, flag_arg};
use serde_json::{Value, json};
use std::sync::Arc;

fn person() -> Value {
    json!({
        "type": "map",
        "schema": {
            "name": {"type": "string", "required": true},
            "friends": {"type": "list", "schema": {"type": "Person"}}
        }
    })
}

fn run(registry: &Arc<Registry>, description: Value, data: Value) -> ValidationReport {
    Validator::new(Arc::clone(registry), &description)
        .unwrap()
        .validate(&data, &ValidationOptions::new())
        .unwrap()
}

struct Even;

impl Rule for Even {
    fn message(&self) -> &str {
        "must be even"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::Integer
    }

    fn check(
        &self,
        args: &Value,
        value: Option<&Value>,
        ctx: &mut RuleContext,
    ) -> schemata_core::Result<bool> {
        if !flag_arg(ctx.rule_id(), args)? {
            return Ok(true);
        }
        match value.and_then(Value::as_i64) {
            Some(n) if n % 2 != 0 => Ok(ctx.fail(json!({}))),
            _ => Ok(true),
        }
    }
}

#[test]
fn test_self_referential_type() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Person", &person()).unwrap();

    let report = run(
        &registry,
        json!({"type": "Person"}),
        json!({"name": "Ada", "friends": [{"name": "Bob", "friends": [{"friends": []}]}]}),
    );

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, "required");
    assert_eq!(report.errors[0].pointer(), "/friends/0/friends/0/name");
}

#[test]
fn test_registering_a_type_twice_keeps_the_latest() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Code", &json!({"type": "string"})).unwrap();
    registry.register_type("Code", &json!({"type": "integer"})).unwrap();

    let report = run(&registry, json!({"type": "Code"}), json!("abc"));
    assert_eq!(report.codes(), vec!["type"]);

    let report = run(&registry, json!({"type": "Code"}), json!(7));
    assert!(report.passed);
}

#[test]
fn test_unregistering_restores_unknown_type_and_rule_failures() {
    let registry = Arc::new(Registry::new());
    let by_type = json!({"type": "Score"});
    let by_rule = json!({"type": "integer", "even": true});

    let type_before = Validator::new(Arc::clone(&registry), &by_type).unwrap_err();
    let rule_before = Validator::new(Arc::clone(&registry), &by_rule).unwrap_err();

    registry.register_type("Score", &json!({"type": "integer"})).unwrap();
    registry.register_rule("even", Arc::new(Even));
    assert!(Validator::new(Arc::clone(&registry), &by_type).is_ok());
    assert!(Validator::new(Arc::clone(&registry), &by_rule).is_ok());

    assert!(registry.types().unregister("Score").unwrap());
    assert!(registry.rules().unregister("even"));

    assert_eq!(Validator::new(Arc::clone(&registry), &by_type).unwrap_err(), type_before);
    assert_eq!(Validator::new(Arc::clone(&registry), &by_rule).unwrap_err(), rule_before);
}

#[test]
fn test_validator_built_before_unregister_fails_hard() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Score", &json!({"type": "integer"})).unwrap();
    let validator = Validator::new(Arc::clone(&registry), &json!({"type": "Score"})).unwrap();

    registry.types().unregister_all();
    let err = validator.validate(&json!(1), &ValidationOptions::new()).unwrap_err();
    assert_eq!(err, SchemaError::UnknownType("Score".to_string()));
}

#[test]
fn test_registering_a_rule_twice_keeps_the_latest() {
    struct Never;
    impl Rule for Never {
        fn message(&self) -> &str {
            "never"
        }
        fn check(&self, _: &Value, _: Option<&Value>, ctx: &mut RuleContext) -> schemata_core::Result<bool> {
            Ok(ctx.fail(json!({})))
        }
    }

    let registry = Arc::new(Registry::new());
    registry.register_rule("even", Arc::new(Never));
    registry.register_rule("even", Arc::new(Even));

    let report = run(&registry, json!({"type": "integer", "even": true}), json!(4));
    assert!(report.passed, "{:?}", report.errors);

    let report = run(&registry, json!({"type": "integer", "even": true}), json!(5));
    assert_eq!(report.codes(), vec!["even"]);
    assert_eq!(report.errors[0].message, "must be even");
}

#[test]
fn test_custom_message_and_meta_on_rule_entry() {
    let registry = Arc::new(Registry::new());
    registry.register_rule("even", Arc::new(Even));

    let report = run(
        &registry,
        json!({
            "type": "integer",
            "rules": [{"even": true, "message": "pick an even number", "meta": {"hint": "try 2"}}]
        }),
        json!(3),
    );

    assert_eq!(report.errors[0].message, "pick an even number");
    assert_eq!(report.errors[0].meta.get("hint"), Some(&json!("try 2")));
}

#[test]
fn test_rule_on_wrong_kind_is_a_hard_error() {
    let registry = Arc::new(Registry::new());
    registry.register_rule("even", Arc::new(Even));

    let validator = Validator::new(Arc::clone(&registry), &json!({"type": "string", "even": true})).unwrap();
    let err = validator
        .validate(&json!("abc"), &ValidationOptions::new())
        .unwrap_err();

    assert!(matches!(err, SchemaError::InapplicableValidationRule { .. }));
}

#[test]
fn test_unknown_names_rejected_at_parse_time() {
    let registry = Arc::new(Registry::new());

    let err = Validator::new(Arc::clone(&registry), &json!({"type": "Ghost"})).unwrap_err();
    assert!(err.to_string().contains("Ghost"), "{err}");

    let err = Validator::new(Arc::clone(&registry), &json!({"type": "integer", "even": true})).unwrap_err();
    assert!(err.to_string().contains("even"), "{err}");
}

#[test]
fn test_builtin_type_names_are_reserved() {
    let registry = Registry::new();
    let err = registry.register_type("string", &json!({"type": "integer"})).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateBuiltinType(_)));
}

#[test]
fn test_mutually_referencing_batch() {
    let registry = Arc::new(Registry::new());
    registry
        .register_types(&json!({
            "Author": {
                "type": "map",
                "schema": {"books": {"type": "list", "schema": {"type": "Book"}}}
            },
            "Book": {
                "type": "map",
                "schema": {"title": {"type": "string", "required": true}, "author": {"type": "Author"}}
            }
        }))
        .unwrap();

    let report = run(
        &registry,
        json!({"type": "Author"}),
        json!({"books": [{"title": "Dune", "author": {"books": [{}]}}]}),
    );
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].pointer(), "/books/0/author/books/0/title");
}

#[test]
fn test_type_error_names_the_declared_type() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Person", &person()).unwrap();
    registry.register_type("Age", &json!({"type": "integer", "min": 0})).unwrap();
    registry.register_type("Years", &json!({"type": "Age"})).unwrap();

    let report = run(
        &registry,
        json!({
            "type": "map",
            "schema": {
                "owner": {"type": "Person"},
                "age": {"type": "Years"},
                "count": {"type": "integer"}
            }
        }),
        json!({"owner": "Ada", "age": "old", "count": "many"}),
    );

    let messages: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "must be of type Person",
            "must be of type Years",
            "must be of type integer",
        ]
    );
}

#[test]
fn test_alias_chain_resolves_to_its_target() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Age", &json!({"type": "integer", "min": 0})).unwrap();
    registry.register_type("Years", &json!({"type": "Age"})).unwrap();

    let report = run(&registry, json!({"type": "Years"}), json!(-1));
    assert_eq!(report.codes(), vec!["min"]);
}

#[test]
fn test_sanitize_then_validate() {
    let registry = Arc::new(Registry::new());
    registry.register_type("Person", &person()).unwrap();
    let description = json!({"type": "Person"});

    let sanitizer = Sanitizer::new(Arc::clone(&registry), &description).unwrap();
    let clean = sanitizer
        .sanitize(
            &json!({"name": 42, "nickname": "x", "friends": [{"name": " Bob "}]}),
            &Default::default(),
        )
        .unwrap();
    assert_eq!(clean, json!({"name": "42", "friends": [{"name": "Bob"}]}));

    let report = run(&registry, description, clean);
    assert!(report.passed, "{:?}", report.errors);
}
