//! Errors raised by structural edits to a story model.

use thiserror::Error;

use crate::components::NodeId;

/// Errors from editing the containment tree or successor edges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("node {0} is not part of this story model")]
    UnknownNode(NodeId),

    #[error("node {0} is already part of this story model")]
    DuplicateNode(NodeId),

    #[error("node {0} cannot own children")]
    NotComplex(NodeId),

    #[error("node {0} is not a story node")]
    NotStoryNode(NodeId),

    #[error("node {child} is already contained by {owner}")]
    AlreadyContained { child: NodeId, owner: NodeId },

    #[error("adding {child} under {owner} would contain a node inside itself")]
    ContainmentCycle { child: NodeId, owner: NodeId },

    #[error("the root container {0} cannot be removed")]
    RootRemoval(NodeId),
}
