//! String format rules: `email`, `url` and `datetime`.

use crate::rule::{Rule, RuleContext, flag_arg};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use schemata_core::{Kind, Result, SchemaError, describe};
use serde_json::{Value, json};
use validator::{ValidateEmail, ValidateUrl};

/// Formats accepted by `datetime: true`, besides RFC 3339.
const DEFAULT_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

/// `email: true`: the string must be an email address.
#[derive(Debug, Default)]
pub struct EmailRule;

impl Rule for EmailRule {
    fn message(&self) -> &str {
        "must be a valid email address"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::String
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        if !flag_arg(ctx.rule_id(), args)? {
            return Ok(true);
        }
        match value {
            Some(Value::String(s)) if !s.as_str().validate_email() => Ok(ctx.fail(json!({}))),
            _ => Ok(true),
        }
    }
}

/// `url: true`: the string must be an absolute URL.
#[derive(Debug, Default)]
pub struct UrlRule;

impl Rule for UrlRule {
    fn message(&self) -> &str {
        "must be a valid URL"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::String
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        if !flag_arg(ctx.rule_id(), args)? {
            return Ok(true);
        }
        match value {
            Some(Value::String(s)) if !s.as_str().validate_url() => Ok(ctx.fail(json!({}))),
            _ => Ok(true),
        }
    }
}

/// `datetime`: the string must be a date or timestamp.
///
/// `true` accepts RFC 3339, `%Y-%m-%d %H:%M:%S` and `%Y-%m-%d`. A string
/// argument is a chrono format that the value must match instead.
#[derive(Debug, Default)]
pub struct DateTimeRule;

impl Rule for DateTimeRule {
    fn message(&self) -> &str {
        "must be a valid datetime ({format})"
    }

    fn applies_to(&self, kind: &Kind) -> bool {
        *kind == Kind::String
    }

    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
        let format = match args {
            Value::Bool(false) => return Ok(true),
            Value::Bool(true) => None,
            Value::String(format) => Some(format.as_str()),
            other => {
                return Err(SchemaError::rule_args(
                    ctx.rule_id(),
                    format!("expected a boolean or a format string, found {}", describe(other)),
                ));
            }
        };

        let Some(Value::String(text)) = value else {
            return Ok(true);
        };

        let (valid, format) = match format {
            Some(format) => (matches_format(text, format), format),
            None => (is_default_datetime(text), "RFC 3339"),
        };

        if valid {
            return Ok(true);
        }
        Ok(ctx.fail(json!({ "format": format })))
    }
}

fn is_default_datetime(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || DEFAULT_DATETIME_FORMATS
            .iter()
            .any(|format| matches_format(text, format))
}

/// Tries the format as a full timestamp, a date, a time and a zoned timestamp.
fn matches_format(text: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(text, format).is_ok()
        || NaiveDate::parse_from_str(text, format).is_ok()
        || NaiveTime::parse_from_str(text, format).is_ok()
        || DateTime::parse_from_str(text, format).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::testing::run_rule;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_email() {
        let (passed, _) =
            run_rule(&EmailRule, Kind::String, json!(true), Some(json!("ada@example.com"))).unwrap();
        assert!(passed);

        let (passed, errors) =
            run_rule(&EmailRule, Kind::String, json!(true), Some(json!("not-an-email"))).unwrap();
        assert!(!passed);
        assert_eq!(errors[0].message, "must be a valid email address");

        let (passed, _) =
            run_rule(&EmailRule, Kind::String, json!(false), Some(json!("not-an-email"))).unwrap();
        assert!(passed);
    }

    #[test]
    fn test_url() {
        let (passed, _) = run_rule(
            &UrlRule,
            Kind::String,
            json!(true),
            Some(json!("https://example.com/a?b=c")),
        )
        .unwrap();
        assert!(passed);

        let (passed, _) =
            run_rule(&UrlRule, Kind::String, json!(true), Some(json!("example dot com"))).unwrap();
        assert!(!passed);
    }

    #[test]
    fn test_datetime_defaults() {
        for text in ["2024-03-01T12:30:00Z", "2024-03-01 12:30:00", "2024-03-01"] {
            let (passed, _) =
                run_rule(&DateTimeRule, Kind::String, json!(true), Some(json!(text))).unwrap();
            assert!(passed, "{text}");
        }

        let (passed, errors) =
            run_rule(&DateTimeRule, Kind::String, json!(true), Some(json!("yesterday"))).unwrap();
        assert!(!passed);
        assert_eq!(errors[0].message, "must be a valid datetime (RFC 3339)");
    }

    #[test]
    fn test_datetime_custom_format() {
        let (passed, _) =
            run_rule(&DateTimeRule, Kind::String, json!("%d/%m/%Y"), Some(json!("01/03/2024")))
                .unwrap();
        assert!(passed);

        let (passed, errors) =
            run_rule(&DateTimeRule, Kind::String, json!("%d/%m/%Y"), Some(json!("2024-03-01")))
                .unwrap();
        assert!(!passed);
        assert_eq!(errors[0].message, "must be a valid datetime (%d/%m/%Y)");
    }

    #[test]
    fn test_datetime_bad_args() {
        let err = run_rule(&DateTimeRule, Kind::String, json!(3), Some(json!("x"))).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRuleArgs { .. }));

        let err = run_rule(&DateTimeRule, Kind::String, json!(["%Y"]), Some(json!(7))).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRuleArgs { .. }));
    }
}
