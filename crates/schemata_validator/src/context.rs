//! Per-call validation state.

use schemata_core::{
    PathSegment, SchemaNode, ValidationError, ValidationOptions, ValidationReport, ValidationStats,
};
use std::sync::Arc;

/// Mutable state of one validation pass.
///
/// The source path and the schema stack always have the same height: entering
/// a node pushes one segment and one node, leaving it pops both. Use
/// [`within`](Self::within) so the pop happens on every exit path.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    options: ValidationOptions,
    source: Vec<PathSegment>,
    schema_stack: Vec<Arc<SchemaNode>>,
    errors: Vec<ValidationError>,
    stats: ValidationStats,
}

impl ValidationContext {
    /// Creates an empty context for one pass.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            source: Vec::new(),
            schema_stack: Vec::new(),
            errors: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Options of this pass.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Path of the value currently being validated.
    pub fn source(&self) -> &[PathSegment] {
        &self.source
    }

    /// Node currently being validated.
    pub fn current_node(&self) -> Option<&Arc<SchemaNode>> {
        self.schema_stack.last()
    }

    /// Nesting depth of the current value; the document root is depth 0.
    pub fn depth(&self) -> usize {
        self.source.len().saturating_sub(1)
    }

    /// Errors collected so far, in discovery order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of errors collected so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Appends an error.
    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Statistics so far.
    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ValidationStats {
        &mut self.stats
    }

    /// Runs `f` with `segment` and `node` pushed, popping both afterwards.
    pub fn within<T>(
        &mut self,
        segment: PathSegment,
        node: Arc<SchemaNode>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.source.push(segment);
        self.schema_stack.push(node);
        let out = f(self);
        self.schema_stack.pop();
        self.source.pop();
        out
    }

    /// Consumes the context into a report.
    pub fn into_report(self) -> ValidationReport {
        ValidationReport::new(self.errors, self.stats)
    }
}
