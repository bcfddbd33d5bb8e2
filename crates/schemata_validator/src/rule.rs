//! The rule contract.
//!
//! A rule is a named check registered in the [`RuleRegistry`](crate::RuleRegistry)
//! and referenced from schema descriptions by id. Five ids are reserved for the
//! pre-check sequence the engine runs at every node, in this order:
//!
//! 1. `required`
//! 2. `unknownAllowed`
//! 3. `type`
//! 4. `nullable`
//! 5. `blankable`
//!
//! Every other rule runs after the pre-checks, in declaration order.

use crate::context::ValidationContext;
use schemata_core::{
    Kind, PathSegment, Result, RuleSpec, SchemaError, SchemaNode, TYPE_RULE, ValidationError,
    ValidationOptions, describe, render_message,
};
use serde_json::{Map, Number, Value};

/// Id of the presence pre-check.
pub const REQUIRED: &str = "required";
/// Id of the unknown-field pre-check.
pub const UNKNOWN_ALLOWED: &str = "unknownAllowed";
/// Id of the kind pre-check.
pub const TYPE: &str = TYPE_RULE;
/// Id of the null pre-check.
pub const NULLABLE: &str = "nullable";
/// Id of the empty-string pre-check.
pub const BLANKABLE: &str = "blankable";

/// Reserved ids, in evaluation order.
pub const PRECHECKS: [&str; 5] = [REQUIRED, UNKNOWN_ALLOWED, TYPE, NULLABLE, BLANKABLE];

/// Code of the error recorded when data nests deeper than allowed.
pub const MAX_DEPTH: &str = "maxDepth";

/// A named check.
///
/// # Example
///
/// ```rust
/// use schemata_core::{Kind, Result};
/// use schemata_validator::{Rule, RuleContext};
/// use serde_json::{json, Value};
///
/// struct Even;
///
/// impl Rule for Even {
///     fn message(&self) -> &str {
///         "must be even"
///     }
///
///     fn applies_to(&self, kind: &Kind) -> bool {
///         *kind == Kind::Integer
///     }
///
///     fn check(&self, _args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool> {
///         match value.and_then(Value::as_i64) {
///             Some(n) if n % 2 != 0 => Ok(ctx.fail(json!({}))),
///             _ => Ok(true),
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Default message template, used when the schema sets no `message`.
    fn message(&self) -> &str;

    /// Returns true if the rule can run on nodes of `kind`.
    fn applies_to(&self, _kind: &Kind) -> bool {
        true
    }

    /// Checks `value` against `args`.
    ///
    /// Returns `Ok(false)` after recording exactly one error through `ctx`,
    /// `Ok(true)` otherwise. `Err` is reserved for unusable `args`.
    fn check(&self, args: &Value, value: Option<&Value>, ctx: &mut RuleContext) -> Result<bool>;
}

/// What a rule sees while it runs.
pub struct RuleContext<'a> {
    context: &'a mut ValidationContext,
    rule_id: &'a str,
    spec: Option<&'a RuleSpec>,
    template: &'a str,
    node: &'a SchemaNode,
    parent: Option<&'a Value>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        context: &'a mut ValidationContext,
        rule_id: &'a str,
        spec: Option<&'a RuleSpec>,
        template: &'a str,
        node: &'a SchemaNode,
        parent: Option<&'a Value>,
    ) -> Self {
        Self {
            context,
            rule_id,
            spec,
            template,
            node,
            parent,
        }
    }

    /// Id the rule was invoked under.
    pub fn rule_id(&self) -> &'a str {
        self.rule_id
    }

    /// Path of the value being checked.
    pub fn source(&self) -> &[PathSegment] {
        self.context.source()
    }

    /// The node being validated, with named types already expanded.
    pub fn node(&self) -> &'a SchemaNode {
        self.node
    }

    /// The node's kind.
    pub fn kind(&self) -> &'a Kind {
        self.node.kind()
    }

    /// The container holding the value, if the value is not the root.
    pub fn parent(&self) -> Option<&'a Value> {
        self.parent
    }

    /// Options of the current pass.
    pub fn options(&self) -> &ValidationOptions {
        self.context.options()
    }

    /// Records an error at the current path and returns `false`.
    ///
    /// `params` is an object whose entries fill the message placeholders.
    pub fn fail(&mut self, params: Value) -> bool {
        self.record(None, params, Map::new());
        false
    }

    /// Like [`fail`](Self::fail), attaching rule-supplied metadata.
    ///
    /// Metadata configured in the schema wins over keys set here.
    pub fn fail_with_meta(&mut self, params: Value, meta: Map<String, Value>) -> bool {
        self.record(None, params, meta);
        false
    }

    /// Records an error one level below the current path.
    pub fn fail_at(&mut self, segment: impl Into<PathSegment>, params: Value) {
        self.record(Some(segment.into()), params, Map::new());
    }

    fn record(&mut self, segment: Option<PathSegment>, params: Value, mut meta: Map<String, Value>) {
        let mut source = self.context.source().to_vec();
        source.extend(segment);

        let params = match params {
            Value::Object(params) => params,
            _ => Map::new(),
        };
        let template = self
            .spec
            .and_then(|spec| spec.message.as_deref())
            .unwrap_or(self.template);
        let message = render_message(template, &params);

        if let Some(configured) = self.spec.and_then(|spec| spec.meta.as_ref()) {
            for (key, value) in configured {
                meta.insert(key.clone(), value.clone());
            }
        }

        self.context
            .push_error(ValidationError::new(source, self.rule_id, message).with_meta(meta));
    }
}

/// Reads a boolean argument.
pub fn flag_arg(rule: &str, args: &Value) -> Result<bool> {
    args.as_bool()
        .ok_or_else(|| SchemaError::rule_args(rule, format!("expected a boolean, found {}", describe(args))))
}

/// Reads a numeric argument.
pub fn number_arg<'v>(rule: &str, args: &'v Value) -> Result<&'v Number> {
    match args {
        Value::Number(number) => Ok(number),
        other => Err(SchemaError::rule_args(
            rule,
            format!("expected a number, found {}", describe(other)),
        )),
    }
}

/// Reads a non-negative integer argument.
pub fn length_arg(rule: &str, args: &Value) -> Result<usize> {
    args.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| SchemaError::rule_args(rule, format!("expected a non-negative integer, found {args}")))
}

/// Reads a string argument.
pub fn string_arg<'v>(rule: &str, args: &'v Value) -> Result<&'v str> {
    args.as_str()
        .ok_or_else(|| SchemaError::rule_args(rule, format!("expected a string, found {}", describe(args))))
}
