use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stencil_parser::DirectiveKeywords;
use stencil_view::ViewConfig;

pub const DEFAULT_CONFIG_NAME: &str = "stencil.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Keystroke that opens the variable picker
    pub trigger_key: char,

    /// Inserted after every new chip so typing does not abut it
    pub spacing_unit: String,

    /// Run the cleaner on every raw/live switch
    pub clean_on_mode_switch: bool,

    /// Reuse a surviving hidden marker's position when reconciling
    pub anchor_surviving_markers: bool,

    #[serde(flatten)]
    pub view: ViewConfig,

    pub keywords: DirectiveKeywords,
}

impl EditorConfig {
    /// Load config from a directory; a missing file yields the defaults
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            trigger_key: '{',
            spacing_unit: "\u{a0}".to_string(),
            clean_on_mode_switch: true,
            anchor_surviving_markers: true,
            view: ViewConfig::default(),
            keywords: DirectiveKeywords::default(),
        }
    }
}
