//! Presence pre-checks: `required`, `nullable` and `blankable`.
//!
//! The three are orthogonal. `required` only looks at whether the key exists,
//! `nullable` only at `null`, `blankable` only at the empty string.

use crate::rule::{Rule, RuleContext, flag_arg};
use schemata_core::{Kind, Result, is_blank};
use serde_json::{Value, json};

/// Fails when the value is absent from its parent.
#[derive(Debug, Default)]
pub struct RequiredRule;

impl Rule for RequiredRule {
    fn message(&self) -> &str {
        "is required"
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let required = flag_arg(ctx.rule_id(), args)?;
        if required && value.is_none() {
            return Ok(ctx.fail(json!({})));
        }
        Ok(true)
    }
}

/// Fails on `null` unless the argument is `true`.
#[derive(Debug, Default)]
pub struct NullableRule;

impl Rule for NullableRule {
    fn message(&self) -> &str {
        "cannot be null"
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let nullable = flag_arg(ctx.rule_id(), args)?;
        if !nullable && matches!(value, Some(Value::Null)) {
            return Ok(ctx.fail(json!({})));
        }
        Ok(true)
    }
}

/// Fails on the empty string unless the argument is `true`.
#[derive(Debug, Default)]
pub struct BlankableRule;

impl Rule for BlankableRule {
    fn message(&self) -> &str {
        "cannot be blank"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::String
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let blankable = flag_arg(ctx.rule_id(), args)?;
        if !blankable && value.is_some_and(is_blank) {
            return Ok(ctx.fail(json!({})));
        }
        Ok(true)
    }
}
