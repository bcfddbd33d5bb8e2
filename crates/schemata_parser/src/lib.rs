//! Parsing for schemata.
//!
//! This crate does two jobs:
//!
//! - [`document`] loads YAML, TOML and JSON documents (schema descriptions,
//!   named type catalogs, options and the data to validate) into a
//!   `serde_json::Value`, picking the format from the file extension.
//! - [`schema`] turns a schema description into the schema IR, rejecting
//!   structural mistakes with the path of the offending part.
//!
//! # Example
//!
//! ```rust
//! use schemata_parser::{parse_yaml, SchemaParser, Vocabulary};
//!
//! struct Builtins;
//!
//! impl Vocabulary for Builtins {
//!     fn has_rule(&self, id: &str) -> bool {
//!         matches!(id, "required" | "min")
//!     }
//!     fn has_type(&self, _name: &str) -> bool {
//!         false
//!     }
//! }
//!
//! let description = parse_yaml(r#"
//! type: map
//! schema:
//!   age:
//!     type: integer
//!     required: true
//!     min: 0
//! "#).unwrap();
//!
//! let node = SchemaParser::new(&Builtins).parse(&description).unwrap();
//! assert!(node.children().field("age").is_some());
//! ```

pub mod document;
pub mod schema;

pub use document::*;
pub use schema::*;
