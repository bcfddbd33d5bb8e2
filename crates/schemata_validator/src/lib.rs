//! # Schemata Validator
//!
//! Validation engine for schemata. This crate holds everything that runs
//! against data:
//!
//! - the [`Rule`] trait and the built-in rules (presence, type, unknown
//!   fields, numeric and length bounds, allowed values, patterns, formats)
//! - the [`RuleRegistry`] and [`TypeCatalog`], bundled as a [`Registry`]
//! - the [`Validator`], which collects errors with exact source paths
//! - the [`Sanitizer`], which coerces data to the declared kinds
//!
//! ## Example
//!
//! ```rust
//! use schemata_core::ValidationOptions;
//! use schemata_validator::{Registry, Validator};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new());
//! registry
//!     .register_type(
//!         "Person",
//!         &json!({
//!             "type": "map",
//!             "schema": {
//!                 "name": {"type": "string", "required": true},
//!                 "friends": {"type": "list", "schema": {"type": "Person"}}
//!             }
//!         }),
//!     )
//!     .unwrap();
//!
//! let validator = Validator::new(registry, &json!({"type": "Person"})).unwrap();
//! let report = validator
//!     .validate(&json!({"name": "Ada", "friends": [{"friends": []}]}), &ValidationOptions::new())
//!     .unwrap();
//!
//! assert_eq!(report.errors[0].pointer(), "/friends/0/name");
//! ```

mod constraints;
mod context;
mod engine;
mod format;
mod presence;
mod registry;
mod rule;
mod sanitize;
mod schema;

pub use constraints::*;
pub use context::*;
pub use engine::*;
pub use format::*;
pub use presence::*;
pub use registry::*;
pub use rule::*;
pub use sanitize::*;
pub use schema::*;
