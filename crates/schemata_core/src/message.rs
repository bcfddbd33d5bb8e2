//! Message template rendering.
//!
//! Templates are plain strings with `{name}` placeholders, filled from a map
//! of parameters supplied by the rule that failed. Unknown placeholders are
//! left as they are.

use serde_json::{Map, Value};

/// Renders `template`, substituting `{name}` with `params[name]`.
pub fn render_message(template: &str, params: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match params.get(name) {
                    Some(value) => out.push_str(&display_param(value)),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Formats a parameter for humans: strings unquoted, lists comma-separated.
pub fn display_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_param)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_substitutes_placeholders() {
        let rendered = render_message(
            "must be between {min} and {max}",
            &params(json!({"min": 1, "max": 10})),
        );
        assert_eq!(rendered, "must be between 1 and 10");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let rendered = render_message("value {value} not allowed", &Map::new());
        assert_eq!(rendered, "value {value} not allowed");
    }

    #[test]
    fn test_unclosed_brace() {
        let rendered = render_message("oops {min", &params(json!({"min": 1})));
        assert_eq!(rendered, "oops {min");
    }

    #[test]
    fn test_list_and_string_params() {
        let rendered = render_message(
            "{field} must be one of: {allowed}",
            &params(json!({"field": "status", "allowed": ["a", "b", 3]})),
        );
        assert_eq!(rendered, "status must be one of: a, b, 3");
    }
}
