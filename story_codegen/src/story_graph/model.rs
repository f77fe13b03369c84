//! Graph editing over story nodes.
//!
//! [`GraphModel`] holds the editing rules: refuse edges that would close a
//! cycle, respect depth when connecting unrelated nodes, and disconnect a node
//! from every parent when it is removed. [`StoryGraph`] applies them to a
//! [`StoryModel`].

use log::{debug, warn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use story_model::{ModelError, NarrativeNode, NodeId, StoryModel};

use super::reachability::{
    depth_map, descendants, ordered_reachable, parents_within, reachable_from, shortest_path,
};

/// A rooted graph that stores only forward edges.
///
/// Implementors supply the primitive edge operations. Every query and every
/// editing rule is derived from them.
pub trait GraphModel {
    type Node: Copy + Eq + Hash + Debug;

    /// The node every traversal starts from.
    fn start(&self) -> Self::Node;

    /// Create a fresh, unconnected node.
    fn build_new_node(&mut self) -> Self::Node;

    /// Add `child` as a successor of `existing`. Returns whether an edge was added.
    fn add_child(&mut self, child: Self::Node, existing: Self::Node) -> bool;

    /// Remove `child` from the successors of `existing`.
    fn remove_child(&mut self, child: Self::Node, existing: Self::Node) -> bool;

    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Nodes reachable from the start whose successors contain `node`.
    fn parents(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Every node reachable from the start node.
    fn nodes(&self) -> HashSet<Self::Node> {
        reachable_from(self.start(), |n| self.children(n))
    }

    fn descendants_of(&self, node: Self::Node) -> HashSet<Self::Node> {
        descendants(node, |n| self.children(n))
    }

    /// Nodes that reach `node`. Includes `node` only when it lies on a cycle.
    fn ancestors(&self, node: Self::Node) -> HashSet<Self::Node> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<Self::Node> = self.parents(node).into();

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                queue.extend(self.parents(current));
            }
        }

        visited
    }

    /// Longest-path depth of every reachable node. The start node is 0.
    fn depth_map(&self) -> HashMap<Self::Node, usize> {
        depth_map(self.start(), |n| self.children(n))
    }

    fn nodes_for_level(&self, level: usize) -> Vec<Self::Node> {
        self.depth_map()
            .into_iter()
            .filter(|(_, depth)| *depth == level)
            .map(|(node, _)| node)
            .collect()
    }

    /// Connect `child` under `parent` unless doing so would close a cycle.
    ///
    /// Nodes already in an ancestor relation connect directly. Unrelated nodes
    /// connect only when the child is not shallower than the parent.
    fn connect_nodes(&mut self, child: Self::Node, parent: Self::Node) -> bool {
        if child == parent || self.descendants_of(child).contains(&parent) {
            debug!("event=connect_refused reason=cycle child={child:?} parent={parent:?}");
            return false;
        }
        if self.descendants_of(parent).contains(&child) {
            return self.add_child(child, parent);
        }

        let depths = self.depth_map();
        match (depths.get(&child), depths.get(&parent)) {
            (Some(child_depth), Some(parent_depth)) if child_depth < parent_depth => {
                debug!("event=connect_refused reason=upward child={child:?} parent={parent:?}");
                false
            }
            _ => self.add_child(child, parent),
        }
    }

    fn disconnect_nodes(&mut self, child: Self::Node, parent: Self::Node) -> bool {
        self.remove_child(child, parent)
    }

    /// Insert `node` on the route between `first` and `second`.
    ///
    /// The shallower of the two ends becomes the parent of `node`, and the
    /// other becomes its child.
    fn add_node_between(&mut self, node: Self::Node, first: Self::Node, second: Self::Node) -> bool {
        if first == second {
            return false;
        }

        let (upper, lower) = if self.descendants_of(first).contains(&second) {
            (first, second)
        } else if self.descendants_of(second).contains(&first) {
            (second, first)
        } else {
            let depths = self.depth_map();
            let first_depth = depths.get(&first).copied().unwrap_or(0);
            let second_depth = depths.get(&second).copied().unwrap_or(0);
            if first_depth > second_depth {
                (second, first)
            } else {
                (first, second)
            }
        };

        let upper_added = self.add_child(node, upper);
        let lower_added = self.add_child(lower, node);
        upper_added || lower_added
    }

    /// Disconnect `node` from every parent. The start node cannot be removed.
    fn remove_node(&mut self, node: Self::Node) -> bool {
        if node == self.start() || !self.nodes().contains(&node) {
            return false;
        }
        for parent in self.parents(node) {
            self.remove_child(node, parent);
        }
        true
    }

    /// Shortest forward path from `start` to `end`, both ends included.
    fn path_between(&self, start: Self::Node, end: Self::Node) -> Vec<Self::Node> {
        shortest_path(start, end, |n| self.children(n))
    }
}

/// Editing view of the story nodes of a [`StoryModel`].
pub struct StoryGraph<'m> {
    model: &'m mut StoryModel,
    start: NodeId,
    /// Nodes created through this view, in creation order.
    built: Vec<NodeId>,
}

impl<'m> StoryGraph<'m> {
    /// Wrap a model, rooting traversal at `start`.
    pub fn new(model: &'m mut StoryModel, start: NodeId) -> Result<Self, ModelError> {
        let node = model.get(start).ok_or(ModelError::UnknownNode(start))?;
        if !node.is_story() {
            return Err(ModelError::NotStoryNode(start));
        }
        Ok(Self {
            model,
            start,
            built: Vec::new(),
        })
    }

    pub fn model(&self) -> &StoryModel {
        &*self.model
    }

    /// Story nodes reachable from the start node, in preorder.
    pub fn story_points(&self) -> Vec<NodeId> {
        ordered_reachable(self.start, |n| self.model.successors(n).iter().copied())
    }

    /// Remove nodes built through this view that never joined the containment tree.
    ///
    /// Returns the ids that were removed.
    pub fn discard_unplaced(&mut self) -> Vec<NodeId> {
        let model = &*self.model;
        let unplaced: Vec<NodeId> = self
            .built
            .iter()
            .copied()
            .filter(|id| model.contains(*id) && model.owner_of(*id).is_none())
            .collect();

        for id in &unplaced {
            if let Err(err) = self.model.remove_node(*id) {
                warn!("event=story_node_discard_failed node={id} error={err}");
            }
        }
        self.built.retain(|id| !unplaced.contains(id));
        debug!("event=unplaced_nodes_discarded count={}", unplaced.len());
        unplaced
    }

    /// Place `from` and every unowned story node it leads to under `owner`.
    fn adopt_reachable(&mut self, from: NodeId, owner: NodeId) {
        let model = &*self.model;
        let pending: Vec<NodeId> = ordered_reachable(from, |n| model.successors(n).iter().copied())
            .into_iter()
            .filter(|id| model.owner_of(*id).is_none())
            .collect();

        for node in pending {
            if let Err(err) = self.model.add_child(owner, node) {
                warn!("event=story_node_unowned node={node} error={err}");
            }
        }
    }
}

impl GraphModel for StoryGraph<'_> {
    type Node = NodeId;

    fn start(&self) -> NodeId {
        self.start
    }

    /// Insert an unnamed story node. It joins the containment tree once it is
    /// connected below a contained story node.
    fn build_new_node(&mut self) -> NodeId {
        let node = NarrativeNode::story("");
        let id = node.id;
        if let Err(err) = self.model.insert(node) {
            warn!("event=story_node_build_failed node={id} error={err}");
        }
        self.built.push(id);
        id
    }

    fn add_child(&mut self, child: NodeId, existing: NodeId) -> bool {
        let added = match self.model.add_successor(existing, child) {
            Ok(added) => added,
            Err(err) => {
                warn!("event=story_edge_rejected from={existing} to={child} error={err}");
                return false;
            }
        };

        if added {
            if let Some(owner) = self.model.owner_of(existing) {
                self.adopt_reachable(child, owner);
            }
        }
        debug!("event=story_edge_added from={existing} to={child} added={added}");
        added
    }

    fn remove_child(&mut self, child: NodeId, existing: NodeId) -> bool {
        match self.model.remove_successor(existing, child) {
            Ok(removed) => removed,
            Err(err) => {
                warn!("event=story_edge_remove_failed from={existing} to={child} error={err}");
                false
            }
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.model.successors(node).to_vec()
    }

    fn parents(&self, node: NodeId) -> Vec<NodeId> {
        parents_within(self.start, node, |n| self.model.successors(n).iter().copied())
    }
}
