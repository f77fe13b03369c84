//! Variables, bindings, and code blocks.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::format::Fragment;

/// A named value slot that code can refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,

    /// Type keywords, most specific first.
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub binding: Binding,
}

/// What a variable is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    #[default]
    Unbound,
    Constant { value: String },
    StoryPoint { node: NodeId },
}

impl Variable {
    /// Create an unbound variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            binding: Binding::Unbound,
        }
    }

    /// Create a variable bound to a constant value.
    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).with_binding(Binding::Constant {
            value: value.into(),
        })
    }

    pub fn with_type(mut self, type_keyword: impl Into<String>) -> Self {
        self.types.push(type_keyword.into());
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self.binding, Binding::Unbound)
    }

    /// The first declared type keyword.
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

/// The primary code-emission unit of an event-bound component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Keyword of the slot this block attaches to. `None` uses the default keyword.
    #[serde(default)]
    pub slot: Option<String>,

    /// Name of the parameter the event fires on.
    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub parameters: Vec<Variable>,

    /// Files the generated code needs included.
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub code: Vec<Fragment>,
}

impl CodeBlock {
    /// Create an empty code block with no explicit slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty code block bound to a slot.
    pub fn for_slot(keyword: impl Into<String>) -> Self {
        Self {
            slot: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_type(mut self, type_keyword: impl Into<String>) -> Self {
        self.types.push(type_keyword.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Variable) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    pub fn with_code(mut self, code: Vec<Fragment>) -> Self {
        self.code = code;
        self
    }

    /// Find a parameter by name, ignoring case.
    pub fn parameter(&self, name: &str) -> Option<&Variable> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_binding() {
        let unbound = Variable::new("target");
        assert!(!unbound.is_bound());

        let bound = Variable::constant("target", "npc_guard").with_type("creature");
        assert!(bound.is_bound());
        assert_eq!(bound.primary_type(), Some("creature"));
    }

    #[test]
    fn test_parameter_lookup_ignores_case() {
        let block = CodeBlock::for_slot("onUse")
            .with_parameter(Variable::constant("Speaker", "npc_bob"))
            .with_parameter(Variable::new("listener"));

        assert_eq!(block.parameter("speaker").map(|p| p.name.as_str()), Some("Speaker"));
        assert!(block.parameter("LISTENER").is_some());
        assert!(block.parameter("missing").is_none());
    }
}
