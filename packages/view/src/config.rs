use serde::{Deserialize, Serialize};

/// Presentation settings shared by markup serialization and cleaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    /// Class on the wrapper element of a placeholder chip
    pub chip_class: String,

    /// Class on the wrapper element of a hidden directive marker
    pub marker_class: String,

    /// Keep newlines when collapsing whitespace during cleaning
    pub preserve_line_breaks: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            chip_class: "highlight-liquid".to_string(),
            marker_class: "liquid-directive".to_string(),
            preserve_line_breaks: true,
        }
    }
}
