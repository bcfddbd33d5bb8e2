//! Schema intermediate representation.
//!
//! A [`SchemaNode`] is built once by the parser and never mutated afterwards.
//! Child nodes are reference counted so that named-type expansion can build
//! merged nodes per occurrence without deep-copying whole subtrees.

use crate::kind::Kind;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Id of the rule that declares a node's kind.
pub const TYPE_RULE: &str = "type";

/// One configured rule within a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSpec {
    /// Rule name
    pub id: String,

    /// Rule-specific configuration, checked by the rule when it runs
    pub args: Value,

    /// Custom message template overriding the rule's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Metadata attached to every error this rule emits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl RuleSpec {
    /// Creates a rule configuration with no message or metadata.
    pub fn new(id: impl Into<String>, args: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            args: args.into(),
            message: None,
            meta: None,
        }
    }

    /// Sets a custom message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets metadata.
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The arguments as a boolean flag, if they are one.
    pub fn flag(&self) -> Option<bool> {
        self.args.as_bool()
    }
}

/// Child schemas of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Children {
    /// Scalar and named kinds have no children of their own
    #[default]
    None,
    /// Item schema of a `list`
    Item(Arc<SchemaNode>),
    /// Field schemas of a `map`, in declaration order
    Fields(Vec<(String, Arc<SchemaNode>)>),
    /// Element schemas of a `tuple`, one per position
    Elements(Vec<Arc<SchemaNode>>),
}

impl Children {
    /// Looks up a declared field of a `map`.
    pub fn field(&self, name: &str) -> Option<&Arc<SchemaNode>> {
        match self {
            Children::Fields(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    /// Iterates over every direct child node.
    pub fn nodes(&self) -> Box<dyn Iterator<Item = &Arc<SchemaNode>> + '_> {
        match self {
            Children::None => Box::new(std::iter::empty()),
            Children::Item(item) => Box::new(std::iter::once(item)),
            Children::Fields(fields) => Box::new(fields.iter().map(|(_, node)| node)),
            Children::Elements(elements) => Box::new(elements.iter()),
        }
    }
}

/// One node of a parsed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    kind: Kind,
    rules: Vec<RuleSpec>,
    children: Children,
}

impl SchemaNode {
    /// Creates a node of the given kind with only its `type` rule.
    pub fn new(kind: Kind) -> Self {
        let type_rule = RuleSpec::new(TYPE_RULE, kind.name());
        Self {
            kind,
            rules: vec![type_rule],
            children: Children::None,
        }
    }

    /// The node's kind.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Configured rules in declaration order, including `type`.
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// Looks up a configured rule.
    pub fn rule(&self, id: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|spec| spec.id == id)
    }

    /// Child schemas.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Adds a rule, replacing an existing rule with the same id in place.
    ///
    /// The first declaration keeps its position; the last one provides the
    /// configuration.
    pub fn insert_rule(&mut self, spec: RuleSpec) {
        match self.rules.iter_mut().find(|existing| existing.id == spec.id) {
            Some(existing) => *existing = spec,
            None => self.rules.push(spec),
        }
    }

    /// Builder-style [`insert_rule`](Self::insert_rule).
    pub fn with_rule(mut self, spec: RuleSpec) -> Self {
        self.insert_rule(spec);
        self
    }

    /// Sets the child schemas.
    pub fn with_children(mut self, children: Children) -> Self {
        self.children = children;
        self
    }

    /// Substitutes a named type's expansion into this node.
    ///
    /// The result takes the expansion's kind and children. Its rules are the
    /// expansion's rules with this node's rules layered on top: a local rule
    /// replaces an expansion rule of the same id, new ones are appended. The
    /// `type` rule keeps the expansion's kind but takes the local declared
    /// type name, plus a local custom message or metadata when one is set, so
    /// type errors name the type the schema declared.
    pub fn expand(&self, expansion: &SchemaNode) -> SchemaNode {
        let mut merged = expansion.clone();
        for spec in &self.rules {
            if spec.id == TYPE_RULE {
                if let Some(type_rule) = merged.rules.iter_mut().find(|r| r.id == TYPE_RULE) {
                    type_rule.args = spec.args.clone();
                    if spec.message.is_some() {
                        type_rule.message = spec.message.clone();
                    }
                    if spec.meta.is_some() {
                        type_rule.meta = spec.meta.clone();
                    }
                }
                continue;
            }
            merged.insert_rule(spec.clone());
        }
        merged
    }

    /// Counts this node and its descendants, without following named types.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .nodes()
            .map(|child| child.node_count())
            .sum::<usize>()
    }
}
