//! Main validation engine.
//!
//! The [`Validator`] walks data and schema in lockstep. At every node it:
//!
//! 1. expands a named type into the node, if the node refers to one
//! 2. runs the pre-check sequence (`required`, `unknownAllowed`, `type`,
//!    `nullable`, `blankable`), stopping at the first failure
//! 3. runs the node's other rules in declaration order, stopping at the first
//!    failure
//! 4. descends into map fields, list items or tuple elements
//!
//! Errors are collected in a [`ValidationContext`] and never returned as
//! `Err`; `Err` means the schema itself is unusable.

use crate::context::ValidationContext;
use crate::registry::Registry;
use crate::rule::{BLANKABLE, MAX_DEPTH, NULLABLE, PRECHECKS, REQUIRED, RuleContext};
use schemata_core::{
    Children, PathSegment, Result, SchemaError, SchemaNode, ValidationError, ValidationOptions,
    ValidationReport, is_blank, render_message, to_pointer,
};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Where a value sits in its parent.
#[derive(Debug, Clone, Copy)]
struct Slot<'d> {
    value: Option<&'d Value>,
    parent: Option<&'d Value>,
    /// Tuple positions must be filled unless the element says otherwise
    positional: bool,
}

/// Validates data against one parsed schema.
///
/// # Example
///
/// ```rust
/// use schemata_core::ValidationOptions;
/// use schemata_validator::{Registry, Validator};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let validator = Validator::new(
///     registry,
///     &json!({
///         "type": "map",
///         "schema": {
///             "meta": {"type": "map", "schema": {"age": {"type": "integer", "required": true}}}
///         }
///     }),
/// )
/// .unwrap();
///
/// let report = validator
///     .validate(&json!({"meta": {}}), &ValidationOptions::new())
///     .unwrap();
///
/// assert!(!report.passed);
/// assert_eq!(report.errors[0].pointer(), "/meta/age");
/// assert_eq!(report.errors[0].code, "required");
/// ```
#[derive(Clone)]
pub struct Validator {
    schema: Arc<SchemaNode>,
    registry: Arc<Registry>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Parses `description` and creates a validator for it.
    pub fn new(registry: Arc<Registry>, description: &Value) -> Result<Self> {
        let schema = registry.parse(description)?;
        Ok(Self::from_node(registry, schema))
    }

    /// Creates a validator for an already parsed schema.
    pub fn from_node(registry: Arc<Registry>, schema: SchemaNode) -> Self {
        debug!(kind = %schema.kind(), nodes = schema.node_count(), "validator created");
        Self {
            schema: Arc::new(schema),
            registry,
        }
    }

    /// The parsed schema.
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// The registry rules and types are looked up in.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Validates `data` and returns every problem found.
    ///
    /// `Err` is returned only for schema problems that surface while
    /// validating: bad rule arguments, inapplicable rules, unknown rules or
    /// types.
    pub fn validate(&self, data: &Value, options: &ValidationOptions) -> Result<ValidationReport> {
        let start = Instant::now();
        let mut ctx = ValidationContext::new(options.clone());
        self.run(data, &mut ctx)?;
        ctx.stats_mut().duration_ms = start.elapsed().as_millis() as u64;

        let report = ctx.into_report();
        debug!(
            passed = report.passed,
            errors = report.errors.len(),
            nodes = report.stats.nodes_visited,
            rules = report.stats.rules_evaluated,
            "validation finished"
        );
        Ok(report)
    }

    /// Returns true if `data` is valid.
    pub fn is_valid(&self, data: &Value, options: &ValidationOptions) -> Result<bool> {
        Ok(self.validate(data, options)?.passed)
    }

    /// Validates `data` into an existing context.
    ///
    /// Returns whether this call added no errors.
    pub fn run(&self, data: &Value, ctx: &mut ValidationContext) -> Result<bool> {
        let slot = Slot {
            value: Some(data),
            parent: None,
            positional: false,
        };
        self.validate_node(ctx, &self.schema, PathSegment::root(), slot)
    }

    fn validate_node(
        &self,
        ctx: &mut ValidationContext,
        node: &Arc<SchemaNode>,
        segment: PathSegment,
        slot: Slot<'_>,
    ) -> Result<bool> {
        let node = self.registry.resolve(node)?;
        let before = ctx.error_count();
        ctx.within(segment, Arc::clone(&node), |ctx| self.walk(ctx, &node, slot))?;
        Ok(ctx.error_count() == before)
    }

    fn walk(&self, ctx: &mut ValidationContext, node: &SchemaNode, slot: Slot<'_>) -> Result<()> {
        ctx.stats_mut().nodes_visited += 1;
        trace!(path = %to_pointer(ctx.source()), kind = %node.kind(), "validating node");

        // Absent values add no depth
        if slot.value.is_some() && ctx.depth() > ctx.options().max_depth {
            let mut params = Map::new();
            params.insert("maxDepth".to_string(), json!(ctx.options().max_depth));
            let message = render_message("exceeds the maximum depth of {maxDepth}", &params);
            let source = ctx.source().to_vec();
            ctx.push_error(ValidationError::new(source, MAX_DEPTH, message));
            return Ok(());
        }

        if !self.run_prechecks(ctx, node, slot)? {
            return Ok(());
        }

        // Past the pre-checks the value is present, non-null and non-blank
        let Some(value) = slot.value else {
            return Ok(());
        };

        if !self.run_rules(ctx, node, value, slot.parent)? {
            return Ok(());
        }

        self.descend(ctx, node, value)
    }

    /// Runs the pre-check sequence.
    ///
    /// Returns false when the node is finished, either because a check failed
    /// or because a passing check settled it (absent, `null` or blank value).
    fn run_prechecks(&self, ctx: &mut ValidationContext, node: &SchemaNode, slot: Slot<'_>) -> Result<bool> {
        for id in PRECHECKS {
            let rule = self.registry.rules().get(id)?;
            if !rule.applies_to(node.kind()) {
                continue;
            }

            let spec = node.rule(id);
            let default;
            let args = match spec {
                Some(spec) => &spec.args,
                None => {
                    default = Value::Bool(self.default_flag(ctx.options(), id, slot));
                    &default
                }
            };

            ctx.stats_mut().rules_evaluated += 1;
            let mut rule_ctx = RuleContext::new(ctx, id, spec, rule.message(), node, slot.parent);
            if !rule.check(args, slot.value, &mut rule_ctx)? {
                return Ok(false);
            }

            let settled = match (id, slot.value) {
                (REQUIRED, None) => true,
                (NULLABLE, Some(Value::Null)) => true,
                (BLANKABLE, Some(value)) => is_blank(value),
                _ => false,
            };
            if settled {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn default_flag(&self, options: &ValidationOptions, id: &str, slot: Slot<'_>) -> bool {
        if id == REQUIRED && slot.positional {
            return true;
        }
        options.default_for(id).unwrap_or(false)
    }

    /// Runs the non-reserved rules in declaration order.
    fn run_rules(
        &self,
        ctx: &mut ValidationContext,
        node: &SchemaNode,
        value: &Value,
        parent: Option<&Value>,
    ) -> Result<bool> {
        let rules = self.registry.rules();
        for spec in node.rules() {
            if rules.is_reserved(&spec.id) {
                continue;
            }

            let rule = rules.get(&spec.id)?;
            if !rule.applies_to(node.kind()) {
                return Err(SchemaError::InapplicableValidationRule {
                    rule: spec.id.clone(),
                    kind: node.kind().name().to_string(),
                });
            }

            ctx.stats_mut().rules_evaluated += 1;
            let mut rule_ctx = RuleContext::new(ctx, &spec.id, Some(spec), rule.message(), node, parent);
            if !rule.check(&spec.args, Some(value), &mut rule_ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn descend(&self, ctx: &mut ValidationContext, node: &SchemaNode, value: &Value) -> Result<()> {
        match (node.children(), value) {
            (Children::Fields(fields), Value::Object(map)) => {
                for (name, child) in fields {
                    let slot = Slot {
                        value: map.get(name),
                        parent: Some(value),
                        positional: false,
                    };
                    self.validate_node(ctx, child, name.into(), slot)?;
                }
            }
            (Children::Item(child), Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let slot = Slot {
                        value: Some(item),
                        parent: Some(value),
                        positional: false,
                    };
                    self.validate_node(ctx, child, index.into(), slot)?;
                }
            }
            (Children::Elements(elements), Value::Array(items)) => {
                for (index, child) in elements.iter().enumerate() {
                    let slot = Slot {
                        value: items.get(index),
                        parent: Some(value),
                        positional: true,
                    };
                    self.validate_node(ctx, child, index.into(), slot)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
