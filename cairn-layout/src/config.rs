//! Engine configuration.
//!
//! `LayoutConfig` holds the packing parameters and block templates.
//! Absent keys take their defaults; user block templates are merged over
//! the built-in `title` and `close` templates rather than replacing them.

use cairn_api::Origin;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

pub const DEFAULT_COLUMN_WIDTH: f64 = 275.0;
pub const DEFAULT_GUTTER: f64 = 20.0;
pub const DEFAULT_EXPAND_SPACE: f64 = 50.0;

/// Template used when a block or container names none.
pub const TITLE_TEMPLATE: &str = "title";
/// Template used for a container's close bracket.
pub const CLOSE_TEMPLATE: &str = "close";

fn default_templates() -> IndexMap<String, String> {
    let mut templates = IndexMap::new();
    templates.insert(TITLE_TEMPLATE.to_string(), "<div>{{title}}</div>".to_string());
    templates.insert(
        CLOSE_TEMPLATE.to_string(),
        "<button type=\"button\">{{close}}</button>".to_string(),
    );
    templates
}

fn merged_templates<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let user = IndexMap::<String, String>::deserialize(deserializer)?;
    let mut templates = default_templates();
    templates.extend(user);
    Ok(templates)
}

/// Layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of one column.
    pub column_width: f64,
    /// Space between columns and between stacked entries.
    pub gutter: f64,
    /// Edge entries are anchored to.
    pub origin: Origin,
    /// Extra space above and below an expanded container's sub-entries.
    pub expand_space: f64,
    /// Block marker templates by name (mustache syntax).
    #[serde(deserialize_with = "merged_templates")]
    pub block_templates: IndexMap<String, String>,
    /// Selector of the host element that receives the root.
    pub container: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            gutter: DEFAULT_GUTTER,
            origin: Origin::Bottom,
            expand_space: DEFAULT_EXPAND_SPACE,
            block_templates: default_templates(),
            container: None,
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a block template by name.
    pub fn template(&self, name: &str) -> Option<&str> {
        self.block_templates.get(name).map(String::as_str)
    }

    /// Merge option overrides. `container` and `container_width` are
    /// resolved by the engine, not here.
    pub(crate) fn apply(&mut self, options: &LayoutOptions) {
        if let Some(column_width) = options.column_width {
            self.column_width = column_width;
        }
        if let Some(gutter) = options.gutter {
            self.gutter = gutter;
        }
        if let Some(origin) = options.origin {
            self.origin = origin;
        }
        if let Some(expand_space) = options.expand_space {
            self.expand_space = expand_space;
        }
        if let Some(templates) = &options.block_templates {
            self.block_templates
                .extend(templates.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(container) = &options.container {
            self.container = Some(container.clone());
        }
    }
}

/// Partial configuration overrides, applied with
/// `LayoutEngine::set_options` or `LayoutEngine::draw`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub column_width: Option<f64>,
    pub gutter: Option<f64>,
    pub origin: Option<Origin>,
    pub expand_space: Option<f64>,
    pub block_templates: Option<IndexMap<String, String>>,
    /// Resolved through the adapter; also captures the container width.
    pub container: Option<String>,
    /// Set the container width directly.
    pub container_width: Option<f64>,
}

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_width(mut self, column_width: f64) -> Self {
        self.column_width = Some(column_width);
        self
    }

    pub fn gutter(mut self, gutter: f64) -> Self {
        self.gutter = Some(gutter);
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn expand_space(mut self, expand_space: f64) -> Self {
        self.expand_space = Some(expand_space);
        self
    }

    pub fn template(mut self, name: impl Into<String>, markup: impl Into<String>) -> Self {
        self.block_templates
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), markup.into());
        self
    }

    pub fn container(mut self, selector: impl Into<String>) -> Self {
        self.container = Some(selector.into());
        self
    }

    pub fn container_width(mut self, width: f64) -> Self {
        self.container_width = Some(width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.column_width, 275.0);
        assert_eq!(config.gutter, 20.0);
        assert_eq!(config.origin, Origin::Bottom);
        assert_eq!(config.expand_space, 50.0);
        assert_eq!(config.template("title"), Some("<div>{{title}}</div>"));
        assert!(config.template("close").is_some());
        assert_eq!(config.container, None);
    }

    #[test]
    fn test_from_json_fills_absent_keys() {
        let config = LayoutConfig::from_json(r#"{"columnWidth": 100, "origin": "top"}"#).unwrap();
        assert_eq!(config.column_width, 100.0);
        assert_eq!(config.origin, Origin::Top);
        assert_eq!(config.gutter, 20.0);
        assert_eq!(config.expand_space, 50.0);
    }

    #[test]
    fn test_from_json_merges_templates() {
        let config =
            LayoutConfig::from_json(r#"{"blockTemplates": {"date": "<h2>{{date}}</h2>"}}"#).unwrap();
        assert_eq!(config.template("date"), Some("<h2>{{date}}</h2>"));
        assert!(config.template("title").is_some());
        assert!(config.template("close").is_some());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(LayoutConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_apply_options() {
        let mut config = LayoutConfig::default();
        config.apply(
            &LayoutOptions::new()
                .gutter(10.0)
                .column_width(100.0)
                .template("title", "<p>{{title}}</p>"),
        );
        assert_eq!(config.gutter, 10.0);
        assert_eq!(config.column_width, 100.0);
        assert_eq!(config.template("title"), Some("<p>{{title}}</p>"));
        assert_eq!(config.origin, Origin::Bottom);
    }
}
