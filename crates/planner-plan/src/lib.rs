//! Planner Plan
//!
//! This crate provides the execution plan produced by the resolver and the
//! ordering algorithms that build it.
//!
//! - [`RequiresGraph`] is the requires relation restricted to one closure,
//!   with forward (requirements) and reverse (dependents) adjacency.
//! - [`RequiresGraph::topological_order`] emits every node after all of its
//!   requirements, ties broken by name, and reports cycles.
//! - [`RequiresGraph::dependency_count_order`] sorts by (out-degree, name).
//!   It does not guarantee dependency order.
//! - [`ExecutionPlan`] is the immutable, ordered result handed to the executor.

mod error;
mod graph;
mod plan;

pub use error::PlanError;
pub use graph::RequiresGraph;
pub use plan::{ExecutionPlan, PlanStep};
