//! Event slots - the attachment points a translator exposes to stories.
//!
//! A slot has a fixed set of parameters (bound explicitly by the author) and
//! implicits (available automatically wherever the slot fires). Slots are
//! registered in bulk when a translator is loaded and cleared when switching.

mod table;

pub use table::*;

use serde::{Deserialize, Serialize};

use crate::components::Variable;

/// A named event attachment point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Unique within a slot table.
    pub keyword: String,

    pub display_name: String,

    #[serde(default)]
    pub parameters: Vec<Variable>,

    #[serde(default)]
    pub implicits: Vec<Variable>,

    /// Target-language condition guarding the event, if any.
    #[serde(default)]
    pub condition: String,

    /// Format used to emit code for this slot. Empty uses the table default.
    #[serde(default)]
    pub format_keyword: Option<String>,
}

impl Slot {
    /// Create a slot with no variables.
    pub fn new(keyword: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            display_name: display_name.into(),
            parameters: Vec::new(),
            implicits: Vec::new(),
            condition: String::new(),
            format_keyword: None,
        }
    }

    pub fn with_parameter(mut self, parameter: Variable) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_implicit(mut self, implicit: Variable) -> Self {
        self.implicits.push(implicit);
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_format_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.format_keyword = Some(keyword.into());
        self
    }

    /// The slot's own format keyword, or `default` when it has none.
    pub fn format_keyword_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.format_keyword.as_deref() {
            Some(keyword) if !keyword.is_empty() => keyword,
            _ => default,
        }
    }
}
