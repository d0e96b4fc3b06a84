//! Geometry and identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a layout entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The edge entries are anchored to.
///
/// With `Bottom` (the default) entries are positioned by their `top`
/// offset and the layout grows downwards. With `Top` entries are
/// positioned by their `bottom` offset and the layout grows upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Top,
    #[default]
    Bottom,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Top => "top",
            Origin::Bottom => "bottom",
        }
    }
}

/// A measured or hinted box size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_parses_lowercase() {
        let origin: Origin = serde_json::from_str("\"top\"").unwrap();
        assert_eq!(origin, Origin::Top);
        assert_eq!(Origin::default(), Origin::Bottom);
        assert_eq!(Origin::Bottom.as_str(), "bottom");
    }
}
