//! Node kinds.
//!
//! Every schema node has exactly one kind, taken from its `type` rule. The
//! eight built-in kinds are fixed; any other name refers to a named type that
//! is registered at runtime and expanded lazily during validation.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The category of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `true` / `false`
    Boolean,
    /// Whole numbers (anything representable as i64 or u64)
    Integer,
    /// Numbers stored as floating point
    Float,
    /// Any number
    Numeric,
    /// Strings
    String,
    /// Homogeneous arrays described by a single item schema
    List,
    /// Objects described by a field-name to schema mapping
    Map,
    /// Arrays described positionally, one schema per element
    Tuple,
    /// A runtime-registered named type
    Named(String),
}

impl Kind {
    /// Names reserved by the built-in kinds.
    pub const BUILTIN_NAMES: [&'static str; 8] = [
        "boolean", "integer", "float", "numeric", "string", "list", "map", "tuple",
    ];

    /// Returns the built-in kind with the given name, if any.
    pub fn builtin(name: &str) -> Option<Kind> {
        let kind = match name {
            "boolean" => Kind::Boolean,
            "integer" => Kind::Integer,
            "float" => Kind::Float,
            "numeric" => Kind::Numeric,
            "string" => Kind::String,
            "list" => Kind::List,
            "map" => Kind::Map,
            "tuple" => Kind::Tuple,
            _ => return None,
        };
        Some(kind)
    }

    /// Resolves a type name to a kind, treating unknown names as named types.
    pub fn from_name(name: &str) -> Kind {
        Self::builtin(name).unwrap_or_else(|| Kind::Named(name.to_string()))
    }

    /// Returns true if `name` is one of the built-in kind names.
    pub fn is_builtin_name(name: &str) -> bool {
        Self::BUILTIN_NAMES.contains(&name)
    }

    /// The name used for this kind in schema descriptions.
    pub fn name(&self) -> &str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Numeric => "numeric",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Tuple => "tuple",
            Kind::Named(name) => name,
        }
    }

    /// Returns true for `list`, `map` and `tuple`.
    pub fn is_compound(&self) -> bool {
        matches!(self, Kind::List | Kind::Map | Kind::Tuple)
    }

    /// Returns true for built-in kinds that hold a single value.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Kind::Boolean | Kind::Integer | Kind::Float | Kind::Numeric | Kind::String
        )
    }

    /// Returns true for the number kinds.
    pub fn is_number(&self) -> bool {
        matches!(self, Kind::Integer | Kind::Float | Kind::Numeric)
    }

    /// Returns true if `value` belongs to this kind.
    ///
    /// `null` is never accepted here; nullability is a separate rule.
    /// Named kinds accept nothing until they are expanded.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Kind::Boolean => value.is_boolean(),
            Kind::Integer => value.is_i64() || value.is_u64(),
            Kind::Float => value.is_f64(),
            Kind::Numeric => value.is_number(),
            Kind::String => value.is_string(),
            Kind::List | Kind::Tuple => value.is_array(),
            Kind::Map => value.is_object(),
            Kind::Named(_) => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
