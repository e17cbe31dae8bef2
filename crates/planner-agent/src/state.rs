use std::collections::HashMap;
use std::fmt;

use planner_executor::ExecutionLog;
use planner_plan::ExecutionPlan;
use planner_selector::Selection;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStage {
  ReceiveInput,
  GenerateEmbedding,
  SelectFunction,
  ResolveDependencies,
  /// Runs one plan step; repeats while steps remain.
  ExecuteStep,
  GenerateResponse,
  Done,
}

impl AgentStage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ReceiveInput => "receive_input",
      Self::GenerateEmbedding => "generate_embedding",
      Self::SelectFunction => "select_function",
      Self::ResolveDependencies => "resolve_dependencies",
      Self::ExecuteStep => "execute_step",
      Self::GenerateResponse => "generate_response",
      Self::Done => "done",
    }
  }
}

impl fmt::Display for AgentStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Everything a run has produced so far.
#[derive(Debug, Clone)]
pub struct AgentState {
  pub stage: AgentStage,
  pub query: String,
  pub query_embedding: Option<Vec<f32>>,
  pub selection: Option<Selection>,
  pub plan: Option<ExecutionPlan>,
  /// Index of the next plan step to run.
  pub current_step: usize,
  pub executed_functions: Vec<String>,
  pub missing_functions: Vec<String>,
  pub results: HashMap<String, serde_json::Value>,
  pub response: Option<String>,
  pub log: ExecutionLog,
  /// Stages in the order they ran.
  pub history: Vec<AgentStage>,
}

impl AgentState {
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      stage: AgentStage::ReceiveInput,
      query: query.into(),
      query_embedding: None,
      selection: None,
      plan: None,
      current_step: 0,
      executed_functions: Vec::new(),
      missing_functions: Vec::new(),
      results: HashMap::new(),
      response: None,
      log: ExecutionLog::new(),
      history: Vec::new(),
    }
  }

  pub fn is_done(&self) -> bool {
    self.stage == AgentStage::Done
  }

  /// True while the plan still has steps to run.
  pub fn has_pending_steps(&self) -> bool {
    self
      .plan
      .as_ref()
      .is_some_and(|plan| self.current_step < plan.len())
  }
}
