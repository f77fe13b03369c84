//! Story graph module - forward-only narrative graph queries and editing.
//!
//! The graph consists of:
//! - **Story nodes**: complex components that also take part in the graph
//! - **Successor edges**: the only stored edges, always pointing forward
//! - **Parents**: never stored, derived from what is reachable from a start node

mod model;
mod reachability;

pub use model::*;
pub use reachability::*;
