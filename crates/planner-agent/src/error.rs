use planner_resolver::ResolveError;
use planner_selector::SelectorError;
use thiserror::Error;

use crate::state::AgentStage;

#[derive(Debug, Error)]
pub enum AgentError {
  #[error("selection failed: {0}")]
  Selection(#[from] SelectorError),

  #[error("dependency resolution failed: {0}")]
  Resolve(#[from] ResolveError),

  #[error("failed to render response: {0}")]
  Response(#[from] minijinja::Error),

  /// A stage ran before the data it needs was produced.
  #[error("stage {stage} is missing {field}")]
  InvalidState {
    stage: AgentStage,
    field: &'static str,
  },
}
