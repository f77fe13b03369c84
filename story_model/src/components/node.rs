//! Narrative nodes - the units of an authored story.

use serde::{Deserialize, Serialize};

use super::{CodeBlock, NodeCategory, NodeId, Variable};

/// Fan-in given to new story nodes: one completed parent reaches the node.
pub const DEFAULT_FAN_IN: u32 = 1;

/// A single component in the authored structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeNode {
    pub id: NodeId,

    /// Display name. Empty for a node that has not been named yet.
    pub name: String,

    pub kind: NodeKind,
}

/// Variant data for each node shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Atomic(AtomicNode),
    Complex(ComplexNode),
    Story(StoryNode),
}

/// A leaf component carrying a value and, optionally, variables it defines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtomicNode {
    pub value: String,
    pub variables: Vec<Variable>,
}

/// A component owning an ordered sequence of children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplexNode {
    pub children: Vec<NodeId>,

    /// Primary code-emission unit, present on event-bound components.
    pub code_block: Option<CodeBlock>,
}

/// A complex component that also takes part in the story graph.
///
/// Only forward edges are stored. Parents are always derived from the
/// successor lists of the nodes reachable from a start node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNode {
    pub children: Vec<NodeId>,
    pub successors: Vec<NodeId>,

    /// Number of parents that must complete before this node is reached.
    pub fan_in: u32,
}

impl Default for StoryNode {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            successors: Vec::new(),
            fan_in: DEFAULT_FAN_IN,
        }
    }
}

impl NarrativeNode {
    /// Create an atomic node with the given name and value.
    pub fn atomic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind: NodeKind::Atomic(AtomicNode {
                value: value.into(),
                variables: Vec::new(),
            }),
        }
    }

    /// Create an atomic node that defines a single variable.
    ///
    /// The node takes its name from the variable.
    pub fn variable(variable: Variable) -> Self {
        Self {
            id: NodeId::new(),
            name: variable.name.clone(),
            kind: NodeKind::Atomic(AtomicNode {
                value: String::new(),
                variables: vec![variable],
            }),
        }
    }

    /// Create an empty complex node.
    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind: NodeKind::Complex(ComplexNode::default()),
        }
    }

    /// Create an empty story node.
    pub fn story(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind: NodeKind::Story(StoryNode::default()),
        }
    }

    /// Attach a main code block. Only complex nodes carry one; other kinds are left unchanged.
    pub fn with_code_block(mut self, block: CodeBlock) -> Self {
        if let NodeKind::Complex(complex) = &mut self.kind {
            complex.code_block = Some(block);
        }
        self
    }

    /// Add a variable to an atomic node. Other kinds are left unchanged.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        if let NodeKind::Atomic(atomic) = &mut self.kind {
            atomic.variables.push(variable);
        }
        self
    }

    /// Set the fan-in of a story node. Other kinds are left unchanged.
    pub fn with_fan_in(mut self, fan_in: u32) -> Self {
        if let NodeKind::Story(story) = &mut self.kind {
            story.fan_in = fan_in;
        }
        self
    }

    pub fn category(&self) -> NodeCategory {
        match self.kind {
            NodeKind::Atomic(_) => NodeCategory::Atomic,
            NodeKind::Complex(_) => NodeCategory::Complex,
            NodeKind::Story(_) => NodeCategory::Story,
        }
    }

    /// Whether the node has not been given a display name.
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_story(&self) -> bool {
        matches!(self.kind, NodeKind::Story(_))
    }

    /// Ordered children, or `None` for atomic nodes which have no children accessor.
    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::Atomic(_) => None,
            NodeKind::Complex(complex) => Some(&complex.children),
            NodeKind::Story(story) => Some(&story.children),
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Atomic(_) => None,
            NodeKind::Complex(complex) => Some(&mut complex.children),
            NodeKind::Story(story) => Some(&mut story.children),
        }
    }

    /// Successor list for story nodes; empty for everything else.
    pub fn successors(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Story(story) => &story.successors,
            _ => &[],
        }
    }

    /// Variables this node defines itself (atomic nodes only).
    pub fn own_variables(&self) -> &[Variable] {
        match &self.kind {
            NodeKind::Atomic(atomic) => &atomic.variables,
            _ => &[],
        }
    }

    pub fn code_block(&self) -> Option<&CodeBlock> {
        match &self.kind {
            NodeKind::Complex(complex) => complex.code_block.as_ref(),
            _ => None,
        }
    }

    pub fn fan_in(&self) -> Option<u32> {
        match &self.kind {
            NodeKind::Story(story) => Some(story.fan_in),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_node_defaults() {
        let node = NarrativeNode::story("");
        assert!(node.is_unnamed());
        assert!(node.is_story());
        assert_eq!(node.fan_in(), Some(DEFAULT_FAN_IN));
        assert!(node.successors().is_empty());
        assert_eq!(node.children(), Some(&[][..]));
    }

    #[test]
    fn test_atomic_has_no_children_accessor() {
        let node = NarrativeNode::atomic("Greeting", "hello");
        assert!(node.children().is_none());
        assert_eq!(node.category(), NodeCategory::Atomic);
    }

    #[test]
    fn test_builders_ignore_other_kinds() {
        let node = NarrativeNode::atomic("Leaf", "1")
            .with_code_block(CodeBlock::new())
            .with_fan_in(3);
        assert!(node.code_block().is_none());
        assert!(node.fan_in().is_none());

        let complex = NarrativeNode::complex("Cause").with_code_block(CodeBlock::for_slot("onEnter"));
        assert_eq!(
            complex.code_block().and_then(|b| b.slot.as_deref()),
            Some("onEnter")
        );
    }

    #[test]
    fn test_variable_node_takes_variable_name() {
        let node = NarrativeNode::variable(Variable::constant("door", "door_01"));
        assert_eq!(node.name, "door");
        assert_eq!(node.own_variables().len(), 1);
    }
}
