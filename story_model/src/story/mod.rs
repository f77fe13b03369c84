//! Story model - the arena owning every component of one authored story.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::components::{NarrativeNode, NodeId, NodeKind};
use crate::error::ModelError;

/// Default display name of the root container.
pub const DEFAULT_ROOT_NAME: &str = "Story";

/// All components of a story plus its root container.
///
/// Containment (owner -> ordered children) and story-graph successor edges
/// are both stored forward only. Owners and graph parents are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryModel {
    nodes: HashMap<NodeId, NarrativeNode>,
    root: NodeId,
}

impl Default for StoryModel {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}

impl StoryModel {
    /// Create a model whose root is an empty complex container.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = NarrativeNode::complex(root_name);
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
        }
    }

    /// Create a model rooted at an existing node, which must be able to own children.
    pub fn with_root(root: NarrativeNode) -> Result<Self, ModelError> {
        if root.children().is_none() {
            return Err(ModelError::NotComplex(root.id));
        }
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Ok(Self {
            nodes,
            root: root_id,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a node to the arena without placing it anywhere.
    ///
    /// A node whose id is already taken is refused and the arena is unchanged.
    pub fn insert(&mut self, node: NarrativeNode) -> Result<NodeId, ModelError> {
        let id = node.id;
        if self.contains(id) {
            return Err(ModelError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Add a node and place it as the last child of `owner`.
    ///
    /// On failure the node is not left behind in the arena.
    pub fn insert_child(&mut self, owner: NodeId, node: NarrativeNode) -> Result<NodeId, ModelError> {
        if !self.contains(owner) {
            return Err(ModelError::UnknownNode(owner));
        }
        let id = self.insert(node)?;
        if let Err(err) = self.add_child(owner, id) {
            self.nodes.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&NarrativeNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NarrativeNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a model built through `new` or `with_root`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NarrativeNode> {
        self.nodes.values()
    }

    /// Ordered children of a node; empty for atomic or unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .and_then(NarrativeNode::children)
            .unwrap_or(&[])
    }

    /// Successor list of a story node; empty for anything else.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(NarrativeNode::successors)
            .unwrap_or(&[])
    }

    /// The component that contains `id`, found by scanning child lists.
    pub fn owner_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.children().is_some_and(|c| c.contains(&id)))
            .map(|node| node.id)
    }

    /// Place `child` as the last child of `owner`.
    pub fn add_child(&mut self, owner: NodeId, child: NodeId) -> Result<(), ModelError> {
        if !self.contains(child) {
            return Err(ModelError::UnknownNode(child));
        }
        let owner_node = self.nodes.get(&owner).ok_or(ModelError::UnknownNode(owner))?;
        if owner_node.children().is_none() {
            return Err(ModelError::NotComplex(owner));
        }
        if let Some(existing) = self.owner_of(child) {
            return Err(ModelError::AlreadyContained {
                child,
                owner: existing,
            });
        }
        if child == self.root || self.is_containment_ancestor(child, owner) {
            return Err(ModelError::ContainmentCycle { child, owner });
        }

        if let Some(children) = self.nodes.get_mut(&owner).and_then(NarrativeNode::children_mut) {
            children.push(child);
        }
        Ok(())
    }

    /// Detach `child` from `owner`. The child stays in the arena.
    pub fn remove_child(&mut self, owner: NodeId, child: NodeId) -> bool {
        match self.nodes.get_mut(&owner).and_then(NarrativeNode::children_mut) {
            Some(children) => {
                let before = children.len();
                children.retain(|c| *c != child);
                children.len() != before
            }
            None => false,
        }
    }

    /// Add a forward edge between two story nodes.
    ///
    /// Returns `Ok(false)` for self-loops and edges that already exist.
    /// Merges and back-edges to earlier nodes are accepted.
    pub fn add_successor(&mut self, from: NodeId, to: NodeId) -> Result<bool, ModelError> {
        let target = self.nodes.get(&to).ok_or(ModelError::UnknownNode(to))?;
        if !target.is_story() {
            return Err(ModelError::NotStoryNode(to));
        }
        let source = self.nodes.get_mut(&from).ok_or(ModelError::UnknownNode(from))?;
        let NodeKind::Story(story) = &mut source.kind else {
            return Err(ModelError::NotStoryNode(from));
        };

        if from == to || story.successors.contains(&to) {
            return Ok(false);
        }
        story.successors.push(to);
        Ok(true)
    }

    /// Remove a forward edge. Returns whether an edge was removed.
    pub fn remove_successor(&mut self, from: NodeId, to: NodeId) -> Result<bool, ModelError> {
        let source = self.nodes.get_mut(&from).ok_or(ModelError::UnknownNode(from))?;
        let NodeKind::Story(story) = &mut source.kind else {
            return Err(ModelError::NotStoryNode(from));
        };
        let before = story.successors.len();
        story.successors.retain(|s| *s != to);
        Ok(story.successors.len() != before)
    }

    /// Remove a node together with everything it contains.
    ///
    /// Successor edges pointing at removed nodes are dropped.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NarrativeNode>, ModelError> {
        if id == self.root {
            return Err(ModelError::RootRemoval(id));
        }
        if !self.contains(id) {
            return Err(ModelError::UnknownNode(id));
        }

        if let Some(owner) = self.owner_of(id) {
            self.remove_child(owner, id);
        }

        let subtree = self.containment_preorder(id);
        let removed_ids: HashSet<NodeId> = subtree.iter().copied().collect();
        let removed: Vec<NarrativeNode> = subtree
            .into_iter()
            .filter_map(|node_id| self.nodes.remove(&node_id))
            .collect();

        for node in self.nodes.values_mut() {
            if let NodeKind::Story(story) = &mut node.kind {
                story.successors.retain(|s| !removed_ids.contains(s));
            }
        }

        debug!(
            "event=node_removed node={} removed_count={}",
            id,
            removed.len()
        );
        Ok(removed)
    }

    /// Every node contained under `start` (inclusive), in preorder.
    pub fn containment_preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if !self.contains(id) || !visited.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }

        order
    }

    /// Whether `ancestor` contains `id`, directly or transitively (or is `id`).
    fn is_containment_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        let mut seen = HashSet::new();
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            if !seen.insert(node) {
                return false;
            }
            current = self.owner_of(node);
        }
        false
    }
}
