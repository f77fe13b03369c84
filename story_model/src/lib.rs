//! # Story Model
//!
//! The narrative-model layer of Storyweave. This crate owns every piece of
//! authored data that code generation reads: story components, the forward
//! successor edges between story nodes, the event slots a translator exposes,
//! and the immutable fragment templates that describe target code.
//!
//! It contains no generation logic; `story_codegen` consumes it read-only.

pub mod components;
pub mod error;
pub mod format;
pub mod slots;
pub mod story;

pub use components::*;
pub use error::*;
pub use format::*;
pub use slots::*;
pub use story::*;
