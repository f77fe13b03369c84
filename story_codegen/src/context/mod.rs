//! Resolution contexts - one per component of the containment tree.
//!
//! A [`ContextTree`] is built once per generation pass over a read-only
//! [`StoryModel`]. Each [`ResolutionContext`] answers attribute queries for
//! its own component and delegates anything it cannot answer to the context
//! of the enclosing component. The chain ends at the root; a query nobody
//! answers is an [`CodegenError::UnresolvedReference`].
//!
//! Contexts by component kind:
//! - **Atomic**: its value, its variables, and the story node a variable is bound to
//! - **Complex**: its code block, slot and parameters
//! - **Story**: its own name and id, fan-in, and derived story parents

mod namifier;

pub use namifier::*;

use log::debug;
use std::collections::HashMap;

use story_model::{Binding, CodeBlock, NarrativeNode, NodeId, NodeKind, SlotTable, StoryModel, Variable};

use crate::error::CodegenError;
use crate::story_graph::{ordered_reachable, parents_within};

/// Index of a context within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

struct ContextEntry<'m> {
    node: &'m NarrativeNode,
    enclosing: Option<ContextId>,
    children: Vec<ContextId>,

    /// Identifier handed out by the namifier for this pass.
    legal_name: String,
}

/// Contexts for every component reachable through containment from the root.
pub struct ContextTree<'m> {
    model: &'m StoryModel,
    slots: &'m SlotTable,
    entries: Vec<ContextEntry<'m>>,
    by_node: HashMap<NodeId, ContextId>,
    story_start: Option<NodeId>,
}

impl<'m> ContextTree<'m> {
    /// Build contexts for a snapshot of `model`.
    ///
    /// `story_start` roots the story graph; when `None`, the first story node
    /// in containment order is used. Fails if the containment tree is
    /// inconsistent or a successor edge leaves it.
    pub fn build(
        model: &'m StoryModel,
        slots: &'m SlotTable,
        story_start: Option<NodeId>,
    ) -> Result<Self, CodegenError> {
        let root_id = model.root();
        let root = model
            .get(root_id)
            .ok_or_else(|| CodegenError::MalformedModel(format!("root component {root_id} is missing")))?;
        if root.children().is_none() {
            return Err(CodegenError::MalformedModel(format!(
                "root component {root_id} is atomic and cannot own components"
            )));
        }

        let mut tree = Self {
            model,
            slots,
            entries: Vec::new(),
            by_node: HashMap::new(),
            story_start: None,
        };
        let mut namifier = Namifier::new();
        let mut stack = vec![(root_id, None)];

        while let Some((node_id, enclosing)) = stack.pop() {
            let node = model.get(node_id).ok_or_else(|| {
                CodegenError::MalformedModel(format!("component {node_id} is contained but does not exist"))
            })?;
            if tree.by_node.contains_key(&node_id) {
                return Err(CodegenError::MalformedModel(format!(
                    "component `{}` ({node_id}) is contained more than once",
                    node.name
                )));
            }

            let name_source = if node.is_story() && node.is_unnamed() {
                format!("story_{}", node_id.unique_32_char_name())
            } else {
                node.name.clone()
            };
            let id = ContextId(tree.entries.len());
            tree.entries.push(ContextEntry {
                node,
                enclosing,
                children: Vec::new(),
                legal_name: namifier.unique_name(&name_source),
            });
            tree.by_node.insert(node_id, id);
            if let Some(ContextId(parent)) = enclosing {
                tree.entries[parent].children.push(id);
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev().map(|child| (*child, Some(id))));
            }
        }

        for entry in &tree.entries {
            if let Some(missing) = entry.node.successors().iter().find(|s| !tree.by_node.contains_key(*s)) {
                return Err(CodegenError::MalformedModel(format!(
                    "story node `{}` leads to {missing}, which is outside the containment tree",
                    entry.node.name
                )));
            }
        }

        tree.story_start = match story_start {
            Some(start) => {
                let entry = tree.by_node.get(&start).map(|id| &tree.entries[id.0]);
                match entry {
                    Some(entry) if entry.node.is_story() => Some(start),
                    Some(_) => {
                        return Err(CodegenError::MalformedModel(format!("story start {start} is not a story node")))
                    }
                    None => {
                        return Err(CodegenError::MalformedModel(format!(
                            "story start {start} is outside the containment tree"
                        )))
                    }
                }
            }
            None => tree.entries.iter().find(|e| e.node.is_story()).map(|e| e.node.id),
        };

        debug!(
            "event=context_tree_built contexts={} story_start={:?}",
            tree.entries.len(),
            tree.story_start.map(|id| id.to_string())
        );
        Ok(tree)
    }

    /// Context of the root component.
    pub fn root(&self) -> ResolutionContext<'_> {
        ResolutionContext {
            tree: self,
            id: ContextId(0),
        }
    }

    pub fn context_for(&self, node: NodeId) -> Option<ResolutionContext<'_>> {
        self.by_node
            .get(&node)
            .map(|id| ResolutionContext { tree: self, id: *id })
    }

    /// All contexts in containment preorder.
    pub fn contexts(&self) -> impl Iterator<Item = ResolutionContext<'_>> {
        (0..self.entries.len()).map(move |i| ResolutionContext {
            tree: self,
            id: ContextId(i),
        })
    }

    pub fn model(&self) -> &'m StoryModel {
        self.model
    }

    pub fn slots(&self) -> &'m SlotTable {
        self.slots
    }

    pub fn story_start(&self) -> Option<NodeId> {
        self.story_start
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn context_of(&self, node: NodeId) -> Result<ResolutionContext<'_>, CodegenError> {
        self.context_for(node).ok_or_else(|| {
            CodegenError::MalformedModel(format!("component {node} is outside the containment tree"))
        })
    }
}

/// The resolution view of one component.
#[derive(Clone, Copy)]
pub struct ResolutionContext<'a> {
    tree: &'a ContextTree<'a>,
    id: ContextId,
}

impl<'a> ResolutionContext<'a> {
    fn entry(&self) -> &'a ContextEntry<'a> {
        &self.tree.entries[self.id.0]
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn tree(&self) -> &'a ContextTree<'a> {
        self.tree
    }

    /// The component this context wraps.
    pub fn component(&self) -> &'a NarrativeNode {
        self.entry().node
    }

    /// Context of the enclosing component; `None` at the root.
    pub fn enclosing(&self) -> Option<ResolutionContext<'a>> {
        self.entry().enclosing.map(|id| ResolutionContext { tree: self.tree, id })
    }

    /// This context followed by every enclosing context up to the root.
    pub fn chain(&self) -> impl Iterator<Item = ResolutionContext<'a>> {
        std::iter::successors(Some(*self), |context| context.enclosing())
    }

    /// Contexts of the contained components, in order. Empty for atomic components.
    pub fn children(&self) -> Vec<ResolutionContext<'a>> {
        self.entry()
            .children
            .iter()
            .map(|id| ResolutionContext { tree: self.tree, id: *id })
            .collect()
    }

    /// Variables defined by the component.
    ///
    /// Atomic components report their own. Complex components report the
    /// variables of everything they contain, in traversal order, duplicates kept.
    pub fn variables(&self) -> Vec<&'a Variable> {
        match &self.component().kind {
            NodeKind::Atomic(atomic) => atomic.variables.iter().collect(),
            _ => self.children().iter().flat_map(|child| child.variables()).collect(),
        }
    }

    /// Text a variable's binding stands for in generated code.
    ///
    /// Reading an unbound variable is an error naming this component.
    pub fn binding_value(&self, variable: &Variable) -> Result<String, CodegenError> {
        match &variable.binding {
            Binding::Unbound => Err(CodegenError::UnboundVariable {
                variable: variable.name.clone(),
                component: self.describe(),
            }),
            Binding::Constant { value } => Ok(value.clone()),
            Binding::StoryPoint { node } => self
                .tree
                .context_for(*node)
                .map(|story| story.entry().legal_name.clone())
                .ok_or_else(|| {
                    CodegenError::MalformedModel(format!(
                        "variable `{}` is bound to story node {node}, which is outside the containment tree",
                        variable.name
                    ))
                }),
        }
    }

    /// Human-readable description used in error reports.
    pub fn describe(&self) -> String {
        let node = self.component();
        if node.is_unnamed() {
            format!("unnamed component ({})", node.id)
        } else {
            format!("component `{}` ({})", node.name, node.id)
        }
    }

    /// Answer `name` from this component alone. `Ok(None)` means "ask the enclosing context".
    pub fn attribute(&self, name: &str) -> Result<Option<String>, CodegenError> {
        let node = self.component();
        let key = name.to_ascii_lowercase();
        let key = key.as_str();

        let value = match &node.kind {
            NodeKind::Story(story) => match key {
                "name" | "value" => Some(self.entry().legal_name.clone()),
                "unique32charname" => Some(node.id.unique_32_char_name()),
                "uniqueid" => Some(node.id.to_string()),
                "fanin" => Some(story.fan_in.to_string()),
                _ => None,
            },
            NodeKind::Atomic(atomic) => match key {
                "name" => Some(self.entry().legal_name.clone()),
                "value" if !atomic.value.is_empty() => Some(atomic.value.clone()),
                "value" => match atomic.variables.first() {
                    Some(variable) => Some(self.binding_value(variable)?),
                    None => Some(String::new()),
                },
                "uniqueid" => atomic.variables.iter().find_map(|variable| match variable.binding {
                    Binding::StoryPoint { node } => Some(node.to_string()),
                    _ => None,
                }),
                "type" => atomic
                    .variables
                    .first()
                    .and_then(Variable::primary_type)
                    .map(str::to_string),
                _ => atomic
                    .variables
                    .iter()
                    .find(|variable| variable.name.eq_ignore_ascii_case(key))
                    .map(|variable| self.binding_value(variable))
                    .transpose()?,
            },
            NodeKind::Complex(complex) => match (key, &complex.code_block) {
                ("name", _) => Some(self.entry().legal_name.clone()),
                (_, Some(block)) => self.block_attribute(block, key)?,
                (_, None) => None,
            },
        };

        Ok(value)
    }

    fn block_attribute(&self, block: &CodeBlock, key: &str) -> Result<Option<String>, CodegenError> {
        let value = match key {
            "slot" => Some(self.block_slot(block)?),
            "slotname" => Some(self.tree.slots.get_display_name(&self.block_slot(block)?)),
            "condition" => Some(self.tree.slots.get_condition(&self.block_slot(block)?)),
            "type" => block.types.first().cloned(),
            "subject" => match &block.subject {
                Some(subject) => {
                    let parameter = block.parameter(subject).ok_or_else(|| self.unresolved(subject))?;
                    Some(self.binding_value(parameter)?)
                }
                None => None,
            },
            _ => block
                .parameter(key)
                .map(|parameter| self.binding_value(parameter))
                .transpose()?,
        };
        Ok(value)
    }

    fn block_slot(&self, block: &CodeBlock) -> Result<String, CodegenError> {
        block
            .slot
            .clone()
            .or_else(|| self.tree.slots.default_format_keyword().map(str::to_string))
            .ok_or_else(|| self.unresolved("slot"))
    }

    /// Resolve `name` here or in the nearest enclosing context that defines it.
    pub fn lookup(&self, name: &str) -> Result<String, CodegenError> {
        for context in self.chain() {
            if let Some(value) = context.attribute(name)? {
                return Ok(value);
            }
        }
        Err(self.unresolved(name))
    }

    pub fn name(&self) -> Result<String, CodegenError> {
        self.lookup("name")
    }

    pub fn value(&self) -> Result<String, CodegenError> {
        self.lookup("value")
    }

    pub fn unique_id(&self) -> Result<String, CodegenError> {
        self.lookup("uniqueid")
    }

    pub fn unique_32_char_name(&self) -> Result<String, CodegenError> {
        self.lookup("unique32charname")
    }

    pub fn fan_in(&self) -> Option<u32> {
        self.component().fan_in()
    }

    /// The nearest code block on the chain.
    pub fn main_code_block(&self) -> Result<&'a CodeBlock, CodegenError> {
        self.chain()
            .find_map(|context| context.component().code_block())
            .ok_or_else(|| self.unresolved("maincodeblock"))
    }

    pub fn parameters(&self) -> Result<Vec<&'a Variable>, CodegenError> {
        Ok(self.main_code_block()?.parameters.iter().collect())
    }

    pub fn includes(&self) -> Result<Vec<&'a str>, CodegenError> {
        Ok(self.main_code_block()?.includes.iter().map(String::as_str).collect())
    }

    /// Slot keyword of the nearest code block, falling back to the translator default.
    pub fn slot_keyword(&self) -> Result<String, CodegenError> {
        self.lookup("slot")
    }

    /// Implicit variables of the active slot. Empty when the slot is unknown.
    pub fn implicits(&self) -> Result<Vec<Variable>, CodegenError> {
        Ok(self.tree.slots.get_implicits(&self.slot_keyword()?))
    }

    /// Parameters declared by the active slot. Empty when the slot is unknown.
    pub fn slot_parameters(&self) -> Result<Vec<Variable>, CodegenError> {
        Ok(self.tree.slots.get_parameters(&self.slot_keyword()?))
    }

    pub fn slot_display_name(&self) -> Result<String, CodegenError> {
        self.lookup("slotname")
    }

    pub fn slot_condition(&self) -> Result<String, CodegenError> {
        self.lookup("condition")
    }

    /// The nearest story node on the chain.
    pub fn nearest_story(&self) -> Option<ResolutionContext<'a>> {
        self.chain().find(|context| context.component().is_story())
    }

    /// Successors of the nearest story node.
    pub fn story_children(&self) -> Result<Vec<ResolutionContext<'a>>, CodegenError> {
        let story = self.nearest_story().ok_or_else(|| self.unresolved("storychildren"))?;
        story
            .component()
            .successors()
            .iter()
            .map(|id| self.tree.context_of(*id))
            .collect()
    }

    /// Parents of the nearest story node, derived from the story start.
    pub fn story_parents(&self) -> Result<Vec<ResolutionContext<'a>>, CodegenError> {
        let story = self.nearest_story().ok_or_else(|| self.unresolved("storyparents"))?;
        let start = self.tree.story_start.ok_or_else(|| self.unresolved("storystart"))?;
        let model = self.tree.model;

        parents_within(start, story.component().id, |n| model.successors(n).iter().copied())
            .into_iter()
            .map(|id| self.tree.context_of(id))
            .collect()
    }

    pub fn story_start(&self) -> Result<ResolutionContext<'a>, CodegenError> {
        let start = self.tree.story_start.ok_or_else(|| self.unresolved("storystart"))?;
        self.tree.context_of(start)
    }

    /// Every story node reachable from the story start, in preorder.
    pub fn story_points(&self) -> Result<Vec<ResolutionContext<'a>>, CodegenError> {
        let start = self.tree.story_start.ok_or_else(|| self.unresolved("storypoints"))?;
        let model = self.tree.model;

        ordered_reachable(start, |n| model.successors(n).iter().copied())
            .into_iter()
            .map(|id| self.tree.context_of(id))
            .collect()
    }

    fn unresolved(&self, reference: &str) -> CodegenError {
        CodegenError::unresolved(reference, self.describe())
    }
}

impl std::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("id", &self.id)
            .field("component", &self.component().id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_model::{ComplexNode, Slot};

    struct Fixture {
        model: StoryModel,
        slots: SlotTable,
    }

    impl Fixture {
        fn new() -> Self {
            let mut slots = SlotTable::new();
            slots.add_event_slot(
                Slot::new("onOpen", "When Opened")
                    .with_parameter(Variable::new("door").with_type("placeable"))
                    .with_implicit(Variable::new("opener").with_type("creature"))
                    .with_condition("GetIsOpen(door)"),
            );
            Self {
                model: StoryModel::default(),
                slots,
            }
        }

        fn tree(&self) -> ContextTree<'_> {
            ContextTree::build(&self.model, &self.slots, None).unwrap()
        }
    }

    #[test]
    fn test_atomic_has_no_children() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let leaf = fixture
            .model
            .insert_child(root, NarrativeNode::atomic("Gold", "100"))
            .unwrap();
        let tree = fixture.tree();

        let context = tree.context_for(leaf).unwrap();
        assert!(context.children().is_empty());
        assert_eq!(context.value().unwrap(), "100");
        assert_eq!(context.enclosing().map(|c| c.component().id), Some(root));
        assert!(tree.root().enclosing().is_none());
    }

    #[test]
    fn test_variable_aggregation_in_traversal_order() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let x = fixture.model.insert_child(root, NarrativeNode::complex("X")).unwrap();
        fixture
            .model
            .insert_child(x, NarrativeNode::variable(Variable::new("p1")))
            .unwrap();
        let y = fixture.model.insert_child(x, NarrativeNode::complex("Y")).unwrap();
        fixture
            .model
            .insert_child(
                y,
                NarrativeNode::variable(Variable::new("q1")).with_variable(Variable::new("q2")),
            )
            .unwrap();
        fixture
            .model
            .insert_child(y, NarrativeNode::variable(Variable::new("p1")))
            .unwrap();
        let tree = fixture.tree();

        let names: Vec<_> = tree
            .context_for(x)
            .unwrap()
            .variables()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "q1", "q2", "p1"]);
    }

    #[test]
    fn test_delegation_up_the_chain() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let cause = fixture
            .model
            .insert_child(
                root,
                NarrativeNode::complex("Door Opens").with_code_block(
                    CodeBlock::for_slot("onOpen")
                        .with_subject("door")
                        .with_parameter(Variable::constant("door", "oGate")),
                ),
            )
            .unwrap();
        let leaf = fixture
            .model
            .insert_child(cause, NarrativeNode::atomic("Note", "creak"))
            .unwrap();
        let tree = fixture.tree();
        let context = tree.context_for(leaf).unwrap();

        assert_eq!(context.attribute("slot").unwrap(), None);
        assert_eq!(context.lookup("slot").unwrap(), "onOpen");
        assert_eq!(context.lookup("Door").unwrap(), "oGate");
        assert_eq!(context.lookup("subject").unwrap(), "oGate");
        assert_eq!(context.slot_display_name().unwrap(), "When Opened");
        assert_eq!(context.slot_condition().unwrap(), "GetIsOpen(door)");
        assert_eq!(context.implicits().unwrap()[0].name, "opener");
        assert_eq!(context.slot_parameters().unwrap()[0].name, "door");
        assert_eq!(context.parameters().unwrap()[0].name, "door");
        assert_eq!(context.name().unwrap(), "Note");
    }

    #[test]
    fn test_unresolved_reference_names_the_component() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let leaf = fixture
            .model
            .insert_child(root, NarrativeNode::atomic("Lever", "1"))
            .unwrap();
        let tree = fixture.tree();

        match tree.context_for(leaf).unwrap().lookup("nonsense") {
            Err(CodegenError::UnresolvedReference { reference, component }) => {
                assert_eq!(reference, "nonsense");
                assert!(component.contains("Lever"));
            }
            other => panic!("expected unresolved reference, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_slot_is_fail_soft() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let block = fixture
            .model
            .insert_child(
                root,
                NarrativeNode::complex("Custom").with_code_block(CodeBlock::for_slot("onWhistle")),
            )
            .unwrap();
        let tree = fixture.tree();
        let context = tree.context_for(block).unwrap();

        assert!(context.implicits().unwrap().is_empty());
        assert_eq!(context.slot_display_name().unwrap(), "");
    }

    #[test]
    fn test_slot_falls_back_to_default_keyword() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let block = fixture
            .model
            .insert_child(root, NarrativeNode::complex("Plain").with_code_block(CodeBlock::new()))
            .unwrap();

        assert!(matches!(
            fixture.tree().context_for(block).unwrap().slot_keyword(),
            Err(CodegenError::UnresolvedReference { .. })
        ));

        fixture.slots.set_default_format_keyword("onOpen");
        let tree = fixture.tree();
        assert_eq!(tree.context_for(block).unwrap().slot_keyword().unwrap(), "onOpen");
    }

    #[test]
    fn test_story_context_overrides_identity() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let start = fixture
            .model
            .insert_child(root, NarrativeNode::story("Open the Gate").with_fan_in(2))
            .unwrap();
        let inner = fixture
            .model
            .insert_child(start, NarrativeNode::complex("Greeting"))
            .unwrap();
        let unnamed = fixture.model.insert_child(root, NarrativeNode::story("")).unwrap();
        let tree = fixture.tree();

        let story = tree.context_for(start).unwrap();
        assert_eq!(story.name().unwrap(), "Open_the_Gate");
        assert_eq!(story.value().unwrap(), "Open_the_Gate");
        assert_eq!(story.unique_id().unwrap(), start.to_string());
        assert_eq!(story.unique_32_char_name().unwrap(), start.unique_32_char_name());
        assert_eq!(story.lookup("fanin").unwrap(), "2");
        assert_eq!(story.fan_in(), Some(2));

        let inner = tree.context_for(inner).unwrap();
        assert_eq!(inner.unique_id().unwrap(), start.to_string());
        assert_eq!(inner.name().unwrap(), "Greeting");
        assert_eq!(tree.story_start(), Some(start));

        let unnamed_name = format!("story_{}", unnamed.unique_32_char_name());
        assert_eq!(tree.context_for(unnamed).unwrap().name().unwrap(), unnamed_name);
    }

    #[test]
    fn test_story_parents_in_diamond() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let ids: Vec<_> = ["A", "B", "C", "D"]
            .into_iter()
            .map(|name| fixture.model.insert_child(root, NarrativeNode::story(name)).unwrap())
            .collect();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
        for (from, to) in [(a, b), (a, c), (b, d), (c, d)] {
            fixture.model.add_successor(from, to).unwrap();
        }
        let tree = ContextTree::build(&fixture.model, &fixture.slots, Some(a)).unwrap();

        let parents: Vec<_> = tree
            .context_for(d)
            .unwrap()
            .story_parents()
            .unwrap()
            .iter()
            .map(|c| c.component().id)
            .collect();
        assert_eq!(parents, vec![b, c]);

        let children: Vec<_> = tree
            .context_for(a)
            .unwrap()
            .story_children()
            .unwrap()
            .iter()
            .map(|c| c.component().id)
            .collect();
        assert_eq!(children, vec![b, c]);
        assert!(tree.context_for(a).unwrap().story_parents().unwrap().is_empty());
        assert_eq!(tree.root().story_points().unwrap().len(), 4);
    }

    #[test]
    fn test_story_point_binding() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let target = fixture.model.insert_child(root, NarrativeNode::story("Finale")).unwrap();
        let leaf = fixture
            .model
            .insert_child(
                root,
                NarrativeNode::variable(
                    Variable::new("goal").with_binding(Binding::StoryPoint { node: target }),
                ),
            )
            .unwrap();
        let tree = fixture.tree();
        let context = tree.context_for(leaf).unwrap();

        assert_eq!(context.unique_id().unwrap(), target.to_string());
        assert_eq!(context.value().unwrap(), "Finale");
        assert_eq!(context.value().unwrap(), tree.context_for(target).unwrap().value().unwrap());
    }

    #[test]
    fn test_unbound_variable_is_an_error() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let leaf = fixture
            .model
            .insert_child(root, NarrativeNode::variable(Variable::new("target")))
            .unwrap();
        let tree = fixture.tree();

        assert!(matches!(
            tree.context_for(leaf).unwrap().value(),
            Err(CodegenError::UnboundVariable { variable, component }) if variable == "target" && component.contains("target")
        ));
    }

    #[test]
    fn test_names_are_unique_per_pass() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let first = fixture.model.insert_child(root, NarrativeNode::complex("Open Gate")).unwrap();
        let second = fixture.model.insert_child(root, NarrativeNode::complex("Open Gate")).unwrap();
        let tree = fixture.tree();

        assert_eq!(tree.context_for(first).unwrap().name().unwrap(), "Open_Gate");
        assert_eq!(tree.context_for(second).unwrap().name().unwrap(), "Open_Gate_1");
    }

    #[test]
    fn test_successor_outside_tree_is_malformed() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let a = fixture.model.insert_child(root, NarrativeNode::story("A")).unwrap();
        let loose = fixture.model.insert(NarrativeNode::story("Loose")).unwrap();
        fixture.model.add_successor(a, loose).unwrap();

        assert!(matches!(
            ContextTree::build(&fixture.model, &fixture.slots, None),
            Err(CodegenError::MalformedModel(_))
        ));
    }

    #[test]
    fn test_double_containment_is_malformed() {
        let mut fixture = Fixture::new();
        let root = fixture.model.root();
        let shared = fixture.model.insert_child(root, NarrativeNode::atomic("Shared", "")).unwrap();
        let other = fixture.model.insert_child(root, NarrativeNode::complex("Other")).unwrap();
        if let Some(NarrativeNode {
            kind: NodeKind::Complex(ComplexNode { children, .. }),
            ..
        }) = fixture.model.get_mut(other)
        {
            children.push(shared);
        }

        assert!(matches!(
            ContextTree::build(&fixture.model, &fixture.slots, None),
            Err(CodegenError::MalformedModel(_))
        ));
    }

    #[test]
    fn test_story_start_must_be_a_story_node() {
        let model = StoryModel::with_root(NarrativeNode::complex("Root")).unwrap();
        let slots = SlotTable::new();
        assert!(ContextTree::build(&model, &slots, None).is_ok());

        let start = model.root();
        assert!(matches!(
            ContextTree::build(&model, &slots, Some(start)),
            Err(CodegenError::MalformedModel(_))
        ));
    }
}
