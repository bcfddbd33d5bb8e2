//! Constraint rules.
//!
//! This module holds the non-reserved built-ins that bound a value:
//! - `min` / `max`: numeric bounds
//! - `minlength` / `maxlength` / `length`: string or list length
//! - `allowed`: membership in a fixed set
//! - `regex`: pattern search over strings

use crate::rule::{Rule, RuleContext, length_arg, number_arg, string_arg};
use regex::Regex;
use schemata_core::{Kind, Result, SchemaError, describe, same_value};
use serde_json::{Number, Value, json};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Which side of a range a rule bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `value >= limit`
    Lower,
    /// `value <= limit`
    Upper,
}

/// `min` and `max` over the number kinds.
#[derive(Debug)]
pub struct RangeRule {
    bound: Bound,
}

impl RangeRule {
    /// The `min` rule.
    pub fn min() -> Self {
        Self { bound: Bound::Lower }
    }

    /// The `max` rule.
    pub fn max() -> Self {
        Self { bound: Bound::Upper }
    }

    fn param(&self) -> &'static str {
        match self.bound {
            Bound::Lower => "min",
            Bound::Upper => "max",
        }
    }
}

impl Rule for RangeRule {
    fn message(&self) -> &str {
        match self.bound {
            Bound::Lower => "must be greater than or equal to {min}",
            Bound::Upper => "must be less than or equal to {max}",
        }
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        kind.is_number()
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let limit = number_arg(ctx.rule_id(), args)?;
        let Some(Value::Number(number)) = value else {
            return Ok(true);
        };

        let ordering = compare_numbers(number, limit);
        let within = match self.bound {
            Bound::Lower => ordering != Ordering::Less,
            Bound::Upper => ordering != Ordering::Greater,
        };
        if within {
            return Ok(true);
        }
        Ok(ctx.fail(json!({ self.param(): limit, "value": number })))
    }
}

/// Compares two JSON numbers, exactly when both are integers.
fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a.cmp(&b);
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// How a length rule compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    /// `minlength`
    AtLeast,
    /// `maxlength`
    AtMost,
    /// `length`
    Exactly,
}

/// Length rules over strings (in characters) and lists (in items).
#[derive(Debug)]
pub struct LengthRule {
    bound: LengthBound,
}

impl LengthRule {
    /// The `minlength` rule.
    pub fn min() -> Self {
        Self {
            bound: LengthBound::AtLeast,
        }
    }

    /// The `maxlength` rule.
    pub fn max() -> Self {
        Self {
            bound: LengthBound::AtMost,
        }
    }

    /// The `length` rule.
    pub fn exact() -> Self {
        Self {
            bound: LengthBound::Exactly,
        }
    }

    fn param(&self) -> &'static str {
        match self.bound {
            LengthBound::AtLeast => "minlength",
            LengthBound::AtMost => "maxlength",
            LengthBound::Exactly => "length",
        }
    }
}

impl Rule for LengthRule {
    fn message(&self) -> &str {
        match self.bound {
            LengthBound::AtLeast => "must have a length of at least {minlength}",
            LengthBound::AtMost => "must have a length of at most {maxlength}",
            LengthBound::Exactly => "must have a length of exactly {length}",
        }
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        matches!(kind, Kind::String | Kind::List)
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let limit = length_arg(ctx.rule_id(), args)?;
        let actual = match value {
            Some(Value::String(s)) => s.chars().count(),
            Some(Value::Array(items)) => items.len(),
            _ => return Ok(true),
        };

        let within = match self.bound {
            LengthBound::AtLeast => actual >= limit,
            LengthBound::AtMost => actual <= limit,
            LengthBound::Exactly => actual == limit,
        };
        if within {
            return Ok(true);
        }
        Ok(ctx.fail(json!({ self.param(): limit, "actual": actual })))
    }
}

/// `allowed`: the value must equal one of the listed values.
#[derive(Debug, Default)]
pub struct AllowedRule;

impl Rule for AllowedRule {
    fn message(&self) -> &str {
        "must be one of: {allowed}"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        kind.is_scalar()
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let Value::Array(allowed) = args else {
            return Err(SchemaError::rule_args(
                ctx.rule_id(),
                format!("expected a list, found {}", describe(args)),
            ));
        };
        let Some(value) = value else {
            return Ok(true);
        };

        if allowed.iter().any(|candidate| same_value(candidate, value)) {
            return Ok(true);
        }
        Ok(ctx.fail(json!({ "allowed": allowed, "value": value })))
    }
}

/// `regex`: the string must contain a match of the pattern.
///
/// The search is unanchored; write `^...$` to match the whole string.
/// Compiled patterns are cached per rule instance.
#[derive(Debug, Default)]
pub struct RegexRule {
    cache: Mutex<HashMap<String, Regex>>,
}

impl RegexRule {
    /// Creates the rule with an empty pattern cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, rule: &str, pattern: &str) -> Result<Regex> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }

        let regex = Regex::new(pattern).map_err(|e| SchemaError::rule_args(rule, e.to_string()))?;
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

impl Rule for RegexRule {
    fn message(&self) -> &str {
        "must match the pattern {regex}"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::String
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let pattern = string_arg(ctx.rule_id(), args)?;
        let regex = self.compiled(ctx.rule_id(), pattern)?;
        let Some(Value::String(text)) = value else {
            return Ok(true);
        };

        if regex.is_match(text) {
            return Ok(true);
        }
        Ok(ctx.fail(json!({ "regex": pattern })))
    }
}
