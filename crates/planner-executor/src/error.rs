use thiserror::Error;

/// A plan step whose function is not in the registry.
///
/// Never returned from execution. It is rendered into the run's log and the
/// run moves on to the next step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("function '{name}' not found in registry")]
pub struct MissingFunction {
  pub name: String,
}
