//! Structural pre-checks: `type` and `unknownAllowed`.

use crate::rule::{Rule, RuleContext, flag_arg};
use schemata_core::{Children, Kind, Result};
use serde_json::{Value, json};

/// Checks that a value belongs to the node's kind.
///
/// `null` always passes; whether it is acceptable is decided by `nullable`.
#[derive(Debug, Default)]
pub struct TypeRule;

impl Rule for TypeRule {
    fn message(&self) -> &str {
        "must be of type {type}"
    }

    /// `args` is the declared type name, which differs from the checked kind
    /// when the node refers to a named type.
    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        match value {
            None | Some(Value::Null) => Ok(true),
            Some(value) if ctx.kind().accepts(value) => Ok(true),
            Some(_) => {
                let declared = args.as_str().unwrap_or_else(|| ctx.kind().name());
                Ok(ctx.fail(json!({ "type": declared })))
            }
        }
    }
}

/// Reports every map key or tuple position the schema does not declare.
///
/// One error per extra entry, at the entry's own path. The check never fails
/// the node: undeclared entries do not stop the declared ones from being
/// validated.
#[derive(Debug, Default)]
pub struct UnknownAllowedRule;

impl Rule for UnknownAllowedRule {
    fn message(&self) -> &str {
        "is not allowed"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::Map | Kind::Tuple)
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        if flag_arg(ctx.rule_id(), args)? {
            return Ok(true);
        }

        let children = ctx.node().children();
        match (children, value) {
            (Children::Fields(_), Some(Value::Object(map))) => {
                for key in map.keys().filter(|key| children.field(key).is_none()) {
                    ctx.fail_at(key, json!({}));
                }
            }
            (Children::Elements(elements), Some(Value::Array(items))) => {
                for index in elements.len()..items.len() {
                    ctx.fail_at(index, json!({}));
                }
            }
            _ => {}
        }
        Ok(true)
    }
}
