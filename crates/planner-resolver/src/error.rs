use planner_graph::GraphError;
use planner_plan::PlanError;
use thiserror::Error;

/// Errors that can occur while resolving a target into a plan.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The target is not in the graph, or its closure came back empty.
  #[error("function not found in graph: {name}")]
  NotFound { name: String },

  /// The closure contains a requires cycle.
  #[error("cyclic dependency among: {}", remaining.join(", "))]
  CyclicDependency { remaining: Vec<String> },

  /// The graph store was unreachable when the resolver was created.
  #[error("cannot connect to graph store: {message}")]
  Connection { message: String },

  /// The closure returned by the store is not self-consistent.
  #[error("invalid closure: {message}")]
  InvalidClosure { message: String },

  /// Graph store query failed.
  #[error("graph store error: {0}")]
  Graph(#[from] GraphError),
}

impl From<PlanError> for ResolveError {
  fn from(err: PlanError) -> Self {
    match err {
      PlanError::CyclicDependency { remaining } => Self::CyclicDependency { remaining },
      other => Self::InvalidClosure {
        message: other.to_string(),
      },
    }
  }
}
