//! # Story Codegen
//!
//! Turns an authored story into source code for a target runtime. This crate
//! reads a `story_model::StoryModel`, answers graph questions about its story
//! nodes, and resolves translator fragments against a chain of resolution
//! contexts.
//!
//! ## Core Components
//!
//! - **story_graph**: Forward-only story graph with derived parents and cycle-safe reachability
//! - **context**: Resolution contexts mirroring the containment tree, one per component
//! - **resolver**: Walks fragment templates against a scope chain to produce text
//! - **translator**: The translator registry (config, slots, formats) passed to a generation pass
//! - **generator**: Drives one generation pass over a story snapshot
//!
//! ## Error Policy
//!
//! - Slot lookups by keyword are fail-soft and return empty values
//! - Unresolved fragment references and malformed models abort the pass without partial output

pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod resolver;
pub mod story_graph;
pub mod translator;

pub use config::*;
pub use context::*;
pub use error::*;
pub use generator::*;
pub use resolver::*;
pub use story_graph::*;
pub use translator::*;
