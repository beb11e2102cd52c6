//! An in-memory hierarchical filesystem over a fixed arena of nodes.
//!
//! Nodes live in a fixed pool of slots and are addressed through generation-checked
//! [`fs::NodeId`] handles. Paths are resolved iteratively, and every mutation either
//! succeeds or leaves the arena untouched.

pub mod arena;
pub mod fs;
pub mod shell;
pub mod sync;
