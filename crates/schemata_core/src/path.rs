//! Source paths and JSON-pointer rendering.
//!
//! A path is a sequence of segments locating a value inside a document. By
//! convention the first segment is the empty key, standing for the document
//! root, so `["", "meta", "age"]` renders as the pointer `/meta/age`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// One step of a path: a map key or a list/tuple index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position in a list or tuple
    Index(usize),
    /// Field name in a map
    Key(String),
}

impl PathSegment {
    /// The segment that stands for the document root.
    pub fn root() -> Self {
        PathSegment::Key(String::new())
    }

    /// The segment as it appears in a pointer, before escaping.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Index(index) => Cow::Owned(index.to_string()),
            PathSegment::Key(key) => Cow::Borrowed(key),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{index}"),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<&String> for PathSegment {
    fn from(key: &String) -> Self {
        PathSegment::Key(key.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Escapes one segment for use in a JSON pointer (`~` → `~0`, `/` → `~1`).
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Renders a path as a JSON pointer.
///
/// The leading root segment produces the leading `/`; a path holding only
/// the root renders as the empty pointer.
pub fn to_pointer(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| escape_segment(&segment.as_text()).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
