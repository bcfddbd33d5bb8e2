//! Validation reports and their consumer-facing renderings.
//!
//! A [`ValidationReport`] carries the flat, ordered list of errors found by
//! one validation pass. Two adapters reshape it for consumers:
//!
//! - [`ValidationReport::to_nested`] groups errors into a tree keyed by path
//! - [`ValidationReport::to_jsonapi`] produces HTTP 422 style error objects

use crate::error::ValidationError;
use crate::path::PathSegment;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Outcome of validating one document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether the document is valid
    pub passed: bool,

    /// Problems found, in discovery order
    pub errors: Vec<ValidationError>,

    /// Execution statistics
    pub stats: ValidationStats,
}

/// Statistics about one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// Schema nodes entered
    pub nodes_visited: usize,

    /// Rule evaluations, pre-checks included
    pub rules_evaluated: usize,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Creates a report from the collected errors.
    pub fn new(errors: Vec<ValidationError>, stats: ValidationStats) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
            stats,
        }
    }

    /// Creates a successful report.
    pub fn success() -> Self {
        Self::new(Vec::new(), ValidationStats::default())
    }

    /// Error codes in discovery order.
    pub fn codes(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.code.as_str()).collect()
    }

    /// Errors whose source path equals `path`.
    pub fn errors_at<'a>(
        &'a self,
        path: &'a [PathSegment],
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.source == path)
    }

    /// Groups the errors into a tree keyed by path segment.
    pub fn to_nested(&self) -> NestedErrors {
        let mut root = NestedErrors::default();
        for error in &self.errors {
            let mut node = &mut root;
            // The first segment is the document root and has no key of its own
            for segment in error.source.iter().skip(1) {
                node = node.fields.entry(segment.to_string()).or_default();
            }
            node.errors.push(NestedError {
                code: error.code.clone(),
                message: error.message.clone(),
                meta: error.meta.clone(),
            });
        }
        root
    }

    /// Renders every error as an HTTP 422 error object.
    pub fn to_jsonapi(&self) -> Vec<JsonApiError> {
        self.errors.iter().map(JsonApiError::from).collect()
    }
}

/// Errors grouped by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NestedErrors {
    /// Errors located exactly at this path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<NestedError>,

    /// Errors located below this path, keyed by the next segment
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, NestedErrors>,
}

impl NestedErrors {
    /// Follows a chain of segments down the tree.
    pub fn get(&self, segments: &[&str]) -> Option<&NestedErrors> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.fields.get(*segment))
    }
}

/// One entry of a [`NestedErrors`] node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedError {
    /// Rule id
    pub code: String,
    /// Rendered message
    pub message: String,
    /// Metadata
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

/// HTTP 422 style error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiError {
    /// HTTP status code, always `"422"`
    pub status: String,
    /// Rule id
    pub code: String,
    /// Short summary shared by all errors of this kind
    pub title: String,
    /// Rendered message
    pub detail: String,
    /// Location of the offending value
    pub source: JsonApiSource,
    /// Metadata
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

/// Location part of a [`JsonApiError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiSource {
    /// JSON pointer into the validated document
    pub pointer: String,
}

impl From<&ValidationError> for JsonApiError {
    fn from(error: &ValidationError) -> Self {
        Self {
            status: "422".to_string(),
            code: error.code.clone(),
            title: "Invalid Attribute".to_string(),
            detail: error.message.clone(),
            source: JsonApiSource {
                pointer: error.pointer(),
            },
            meta: error.meta.clone(),
        }
    }
}
