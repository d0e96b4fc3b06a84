//! Attribute values for entry models.
//!
//! Entry models store an open mapping of attribute name to `Value`.
//! Semantics are entirely caller-defined; the engine only reads the
//! handful of keys listed in [`attr`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered attribute mapping (insertion order is preserved).
pub type AttrMap = IndexMap<String, Value>;

/// Attribute names recognized by the layout engine.
pub mod attr {
    pub const TOP: &str = "top";
    pub const LEFT: &str = "left";
    pub const BOTTOM: &str = "bottom";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const OPACITY: &str = "opacity";
    pub const Z_INDEX: &str = "zIndex";
    pub const TRANSITION: &str = "transition";
    pub const POSITION: &str = "position";
    pub const TRANSFORM: &str = "transform";
    /// Entry target has been attached to the render tree.
    pub const DOM: &str = "dom";
    /// Container only: sub-entries are currently revealed.
    pub const EXPANDED: &str = "expanded";
    /// Provenance tag (`insert` or `append`).
    pub const OPERATION: &str = "operation";
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Nested mapping (e.g. per-property transition durations).
    Map(AttrMap),
}

impl Value {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness: `false`, `0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Map(_) => true,
        }
    }
}

// Convenient conversions
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<AttrMap> for Value {
    fn from(map: AttrMap) -> Self {
        Value::Map(map)
    }
}

/// Build an [`AttrMap`] from `(name, value)` pairs.
///
/// ```ignore
/// let props = attrs([("top", 10.0.into()), ("opacity", 1.into())]);
/// ```
pub fn attrs<K, I>(pairs: I) -> AttrMap
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
