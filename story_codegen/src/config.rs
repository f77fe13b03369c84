//! Generator configuration.

use serde::{Deserialize, Serialize};

/// Knobs for one translator's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Text added per indent level.
    pub indent: String,

    pub line_break: String,

    /// Format resolved against the root context to produce a file.
    pub root_format: String,

    /// Keyword used for code blocks that name no slot.
    pub default_format_keyword: Option<String>,

    /// Maximum nesting of format references before a pass is aborted.
    pub max_format_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            line_break: "\n".to_string(),
            root_format: "file".to_string(),
            default_format_keyword: None,
            max_format_depth: 32,
        }
    }
}
