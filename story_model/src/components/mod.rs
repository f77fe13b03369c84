//! Story component definitions.

mod code_block;
mod node;

pub use code_block::*;
pub use node::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for every component in a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a node ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil node ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// The 32 character hex form of the ID, for targets with short identifier limits.
    pub fn unique_32_char_name(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three shapes a story component can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    Atomic,
    Complex,
    Story,
}
