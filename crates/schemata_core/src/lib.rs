//! # Schemata Core
//!
//! Core data structures shared by the schemata parser, validator and CLI.
//!
//! A schema description is an ordinary nested map (usually decoded from
//! YAML, TOML or JSON) that says what shape some loosely-typed input should
//! have. The parser turns that description into the schema IR defined here,
//! and the validator walks input data against it, collecting
//! [`ValidationError`] records tagged with the exact path of each problem.
//!
//! ## Key Concepts
//!
//! - **Kind**: the fundamental category of a node (`integer`, `map`, ...) or a
//!   named type registered at runtime
//! - **SchemaNode**: one parsed node, holding its ordered [`RuleSpec`]s and
//!   child nodes for `list`, `map` and `tuple` kinds
//! - **ValidationError**: one data problem, with its source path, rule code,
//!   rendered message and metadata
//! - **SchemaError**: hard failures (broken schemas, misconfigured rules)
//!
//! ## Example
//!
//! ```rust
//! use schemata_core::SchemaBuilder;
//!
//! let description = SchemaBuilder::map()
//!     .field("name", SchemaBuilder::string().required(true).rule("minlength", 2))
//!     .field("age", SchemaBuilder::integer().rule("min", 0))
//!     .build();
//!
//! assert_eq!(description["type"], "map");
//! assert_eq!(description["schema"]["name"]["minlength"], 2);
//! ```

pub mod builder;
pub mod error;
pub mod kind;
pub mod message;
pub mod options;
pub mod path;
pub mod report;
pub mod schema;
pub mod value;

pub use builder::*;
pub use error::*;
pub use kind::*;
pub use message::*;
pub use options::*;
pub use path::*;
pub use report::*;
pub use schema::*;
pub use value::*;
