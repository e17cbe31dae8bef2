use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
  #[error("requires edge references unknown node: from={from}, to={to}")]
  InvalidEdge { from: String, to: String },

  /// Ordering stalled with nodes left whose requirements never complete.
  #[error("cyclic dependency among: {}", remaining.join(", "))]
  CyclicDependency { remaining: Vec<String> },
}
