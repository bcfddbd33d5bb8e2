//! Rule and type registries.
//!
//! Both registries are plain objects injected into validators and
//! sanitizers, so tests can build isolated ones. Registration takes `&self`
//! and goes through an `RwLock`, so a shared `Arc<Registry>` can be extended
//! while other threads validate.

use crate::constraints::{AllowedRule, LengthRule, RangeRule, RegexRule};
use crate::format::{DateTimeRule, EmailRule, UrlRule};
use crate::presence::{BlankableRule, NullableRule, RequiredRule};
use crate::rule::{BLANKABLE, NULLABLE, PRECHECKS, REQUIRED, Rule, TYPE, UNKNOWN_ALLOWED};
use crate::schema::{TypeRule, UnknownAllowedRule};
use schemata_core::{Kind, Result, SchemaError, SchemaNode, describe};
use schemata_parser::{SchemaParser, Vocabulary};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// The rules every registry starts with.
fn builtin_rules() -> HashMap<&'static str, Arc<dyn Rule>> {
    let mut rules: HashMap<&'static str, Arc<dyn Rule>> = HashMap::new();
    rules.insert(REQUIRED, Arc::new(RequiredRule));
    rules.insert(UNKNOWN_ALLOWED, Arc::new(UnknownAllowedRule));
    rules.insert(TYPE, Arc::new(TypeRule));
    rules.insert(NULLABLE, Arc::new(NullableRule));
    rules.insert(BLANKABLE, Arc::new(BlankableRule));
    rules.insert("min", Arc::new(RangeRule::min()));
    rules.insert("max", Arc::new(RangeRule::max()));
    rules.insert("minlength", Arc::new(LengthRule::min()));
    rules.insert("maxlength", Arc::new(LengthRule::max()));
    rules.insert("length", Arc::new(LengthRule::exact()));
    rules.insert("allowed", Arc::new(AllowedRule));
    rules.insert("regex", Arc::new(RegexRule::new()));
    rules.insert("email", Arc::new(EmailRule));
    rules.insert("url", Arc::new(UrlRule));
    rules.insert("datetime", Arc::new(DateTimeRule));
    rules
}

/// Maps rule ids to implementations.
///
/// Custom registrations shadow built-ins with the same id, reserved ones
/// included; unregistering brings the built-in back.
pub struct RuleRegistry {
    builtins: HashMap<&'static str, Arc<dyn Rule>>,
    custom: RwLock<HashMap<String, Arc<dyn Rule>>>,
}

impl RuleRegistry {
    /// Creates a registry holding the built-in rules.
    pub fn new() -> Self {
        Self {
            builtins: builtin_rules(),
            custom: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a rule, replacing any earlier custom rule with that id.
    pub fn register(&self, id: impl Into<String>, rule: Arc<dyn Rule>) {
        let id = id.into();
        debug!(rule = %id, shadows_builtin = self.builtins.contains_key(id.as_str()), "registering rule");
        self.custom_mut().insert(id, rule);
    }

    /// Removes a custom rule. Returns false if none was registered.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = self.custom_mut().remove(id).is_some();
        if removed {
            debug!(rule = %id, "unregistered rule");
        }
        removed
    }

    /// Removes every custom rule.
    pub fn unregister_all(&self) {
        self.custom_mut().clear();
        debug!("unregistered all custom rules");
    }

    /// Looks up a rule.
    pub fn get(&self, id: &str) -> Result<Arc<dyn Rule>> {
        if let Some(rule) = self.custom().get(id) {
            return Ok(Arc::clone(rule));
        }
        self.builtins
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownValidationRuleId(id.to_string()))
    }

    /// Returns true if a rule with this id is available.
    pub fn contains(&self, id: &str) -> bool {
        self.builtins.contains_key(id) || self.custom().contains_key(id)
    }

    /// Returns true for the ids of the pre-check sequence.
    pub fn is_reserved(&self, id: &str) -> bool {
        PRECHECKS.contains(&id)
    }

    /// Every available id, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.builtins.keys().map(|id| id.to_string()).collect();
        for id in self.custom().keys() {
            if !self.builtins.contains_key(id.as_str()) {
                ids.push(id.clone());
            }
        }
        ids.sort();
        ids
    }

    fn custom(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Rule>>> {
        self.custom.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn custom_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Rule>>> {
        self.custom.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps type names to parsed schemas.
///
/// Registered types are stored unexpanded; references to other named types,
/// the type itself included, are resolved per occurrence at validation time.
#[derive(Default)]
pub struct TypeCatalog {
    types: RwLock<HashMap<String, Arc<SchemaNode>>>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and registers one named type, replacing an earlier one.
    ///
    /// The description may refer to `name` itself.
    pub fn register(&self, name: &str, description: &Value, rules: &RuleRegistry) -> Result<()> {
        let mut batch = Map::new();
        batch.insert(name.to_string(), description.clone());
        self.register_all(&batch, rules)
    }

    /// Parses and registers a batch of named types.
    ///
    /// Every name in the batch is known while the batch is parsed, so the
    /// types may refer to each other. Nothing is registered if any
    /// description fails to parse.
    pub fn register_all(&self, descriptions: &Map<String, Value>, rules: &RuleRegistry) -> Result<()> {
        if let Some(name) = descriptions.keys().find(|name| Kind::is_builtin_name(name)) {
            return Err(SchemaError::DuplicateBuiltinType(name.clone()));
        }

        let vocabulary = PendingVocabulary {
            rules,
            catalog: self,
            pending: descriptions,
        };
        let parser = SchemaParser::new(&vocabulary);
        let mut parsed = Vec::with_capacity(descriptions.len());
        for (name, description) in descriptions {
            let node = parser.parse(description).inspect_err(|e| {
                debug!(type_name = %name, error = %e, "named type rejected");
            })?;
            parsed.push((name.clone(), Arc::new(node)));
        }

        let mut types = self.types_mut();
        for (name, node) in parsed {
            debug!(type_name = %name, nodes = node.node_count(), "registering type");
            types.insert(name, node);
        }
        Ok(())
    }

    /// Looks up a type.
    ///
    /// Built-in kind names return a bare node of that kind.
    pub fn get(&self, name: &str) -> Result<Arc<SchemaNode>> {
        if let Some(kind) = Kind::builtin(name) {
            return Ok(Arc::new(SchemaNode::new(kind)));
        }
        self.types()
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    /// Returns true if `name` is a registered named type.
    pub fn contains(&self, name: &str) -> bool {
        self.types().contains_key(name)
    }

    /// Removes a named type.
    ///
    /// Built-in kind names cannot be removed.
    pub fn unregister(&self, name: &str) -> Result<bool> {
        if Kind::is_builtin_name(name) {
            return Err(SchemaError::DuplicateBuiltinType(name.to_string()));
        }
        let removed = self.types_mut().remove(name).is_some();
        if removed {
            debug!(type_name = %name, "unregistered type");
        }
        Ok(removed)
    }

    /// Removes every named type.
    pub fn unregister_all(&self) {
        self.types_mut().clear();
        debug!("unregistered all types");
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types().keys().cloned().collect();
        names.sort();
        names
    }

    fn types(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<SchemaNode>>> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn types_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<SchemaNode>>> {
        self.types.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Vocabulary used while a batch of types is being registered.
struct PendingVocabulary<'a> {
    rules: &'a RuleRegistry,
    catalog: &'a TypeCatalog,
    pending: &'a Map<String, Value>,
}

impl Vocabulary for PendingVocabulary<'_> {
    fn has_rule(&self, id: &str) -> bool {
        self.rules.contains(id)
    }

    fn has_type(&self, name: &str) -> bool {
        self.pending.contains_key(name) || self.catalog.contains(name)
    }
}

/// The rule registry and type catalog, together.
///
/// # Example
///
/// ```rust
/// use schemata_validator::Registry;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry
///     .register_type("Tag", &json!({"type": "string", "minlength": 1}))
///     .unwrap();
///
/// let node = registry.parse(&json!({"type": "list", "schema": {"type": "Tag"}})).unwrap();
/// assert_eq!(node.kind().name(), "list");
/// ```
#[derive(Default)]
pub struct Registry {
    rules: RuleRegistry,
    types: TypeCatalog,
}

impl Registry {
    /// Creates a registry with the built-in rules and no named types.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule registry.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// The type catalog.
    pub fn types(&self) -> &TypeCatalog {
        &self.types
    }

    /// Registers a rule.
    pub fn register_rule(&self, id: impl Into<String>, rule: Arc<dyn Rule>) {
        self.rules.register(id, rule);
    }

    /// Parses and registers a named type.
    pub fn register_type(&self, name: &str, description: &Value) -> Result<()> {
        self.types.register(name, description, &self.rules)
    }

    /// Parses and registers every entry of a `name -> description` map.
    pub fn register_types(&self, descriptions: &Value) -> Result<()> {
        match descriptions {
            Value::Object(descriptions) => self.types.register_all(descriptions, &self.rules),
            other => Err(SchemaError::InvalidOptions(format!(
                "type catalog must be a map, found {}",
                describe(other)
            ))),
        }
    }

    /// Parses a schema description against this registry.
    pub fn parse(&self, description: &Value) -> Result<SchemaNode> {
        SchemaParser::new(self).parse(description)
    }

    /// Expands named types until the node has a built-in kind.
    ///
    /// Nodes with a built-in kind are returned as is. Only the node itself is
    /// expanded; its children are resolved when the walk reaches them.
    pub fn resolve(&self, node: &Arc<SchemaNode>) -> Result<Arc<SchemaNode>> {
        let mut current = Arc::clone(node);
        let mut seen = HashSet::new();
        loop {
            let Kind::Named(name) = current.kind() else {
                return Ok(current);
            };
            let name = name.clone();
            let expansion = self.types.get(&name)?;
            if !seen.insert(name.clone()) {
                return Err(SchemaError::CyclicTypeAlias(name));
            }
            current = Arc::new(current.expand(&expansion));
        }
    }
}

impl Vocabulary for Registry {
    fn has_rule(&self, id: &str) -> bool {
        self.rules.contains(id)
    }

    fn has_type(&self, name: &str) -> bool {
        self.types.contains(name)
    }
}
