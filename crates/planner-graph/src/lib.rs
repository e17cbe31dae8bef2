//! Planner Graph
//!
//! This crate provides the persistent function graph consumed by the resolver.
//! Nodes are functions keyed by unique name; the single edge kind is
//! `requires`, where `a -> b` means "a requires b to have run first".
//!
//! The [`GraphStore`] trait is the read surface (lookups and transitive
//! closure). The [`GraphEditor`] trait is the write surface used to load
//! catalogs and maintain descriptions and embeddings.
//!
//! Every operation runs inside its own scoped session: the SQLite store
//! acquires a pooled connection per call and the memory store holds its lock
//! for a single call. Nothing is held across requests.

mod catalog;
mod error;
mod memory;
mod node;
mod sqlite;
mod store;

pub use catalog::load_catalog;
pub use error::GraphError;
pub use memory::MemoryGraphStore;
pub use node::{ClosureEntry, FunctionNode, GraphStats};
pub use sqlite::SqliteGraphStore;
pub use store::{GraphEditor, GraphStore};
