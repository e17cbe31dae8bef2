use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use planner_executor::LogEntry;
use planner_plan::ExecutionPlan;
use serde::Serialize;

use crate::error::AgentError;
use crate::state::{AgentStage, AgentState};

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
  pub query: String,
  pub target: String,
  pub confidence: f32,
  pub plan: ExecutionPlan,
  pub executed_functions: Vec<String>,
  pub missing_functions: Vec<String>,
  pub results: HashMap<String, serde_json::Value>,
  pub response: String,
  pub logs: Vec<LogEntry>,
  pub elapsed: Duration,
}

impl AgentOutcome {
  pub(crate) fn from_state(state: AgentState, elapsed: Duration) -> Result<Self, AgentError> {
    let missing = |field| AgentError::InvalidState {
      stage: AgentStage::Done,
      field,
    };
    let selection = state.selection.ok_or_else(|| missing("selection"))?;
    let plan = state.plan.ok_or_else(|| missing("plan"))?;
    let response = state.response.ok_or_else(|| missing("response"))?;

    Ok(Self {
      query: state.query,
      target: selection.name,
      confidence: selection.confidence,
      plan,
      executed_functions: state.executed_functions,
      missing_functions: state.missing_functions,
      results: state.results,
      response,
      logs: state.log.into_entries(),
      elapsed,
    })
  }
}

impl fmt::Display for AgentOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Response:")?;
    writeln!(f, "{}", self.response)?;
    writeln!(f)?;
    writeln!(f, "Summary")?;
    writeln!(f, "  Query: \"{}\"", self.query)?;
    writeln!(
      f,
      "  Target function: {} (confidence {:.2}%)",
      self.target,
      self.confidence * 100.0
    )?;
    writeln!(f, "  Steps executed: {}", self.executed_functions.len())?;
    writeln!(f, "  Plan:")?;
    for (i, step) in self.plan.iter().enumerate() {
      let marker = if self.missing_functions.contains(&step.name) {
        " (missing)"
      } else {
        ""
      };
      writeln!(f, "    {}. {}{}", i + 1, step.name, marker)?;
    }
    write!(f, "  Total time: {:?}", self.elapsed)
  }
}
