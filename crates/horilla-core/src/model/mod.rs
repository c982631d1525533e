//! Domain types shared by the guard, the snapshot and the SQLite adapter.

pub mod node;

pub use node::{EntityKind, HierarchyNode, NodeId, ParseEnumError};
