//! Planner Config
//!
//! This crate contains the serializable configuration types for the planner.
//! These types describe a function catalog before it is loaded into a graph
//! store and resolved into execution plans.
//!
//! Catalogs can be loaded from:
//! - JSON files (via CLI with `init --catalog=catalog.json`)
//! - The built-in order-flow catalog shipped with this crate
//!
//! The graph store takes these definitions, enforces unique names and valid
//! requires edges, and persists them for the resolver to traverse.

mod catalog;
mod ordering;
mod settings;

pub use catalog::{CatalogDef, CatalogError, FunctionDef};
pub use ordering::{OrderingMode, ParseOrderingModeError};
pub use settings::{StoreLocation, StoreSettings};
