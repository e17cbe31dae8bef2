//! Plan executor implementation.

use std::collections::HashMap;

use planner_plan::ExecutionPlan;
use planner_registry::FunctionRegistry;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::log::{LogEntry, LogLevel};
use crate::run::PlanRun;

/// Result of running a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
  /// Unique execution ID.
  pub execution_id: String,
  pub target: String,
  /// Steps that ran, in plan order.
  pub executed_functions: Vec<String>,
  /// Steps skipped for lack of an implementation, in plan order.
  pub missing_functions: Vec<String>,
  /// Result of each executed step, keyed by function name.
  pub results: HashMap<String, serde_json::Value>,
  pub logs: Vec<LogEntry>,
}

impl ExecutionReport {
  pub fn missing(&self) -> &[String] {
    &self.missing_functions
  }

  /// True when every step had an implementation.
  pub fn is_complete(&self) -> bool {
    self.missing_functions.is_empty()
  }

  pub fn errors(&self) -> impl Iterator<Item = &LogEntry> {
    self.logs.iter().filter(|e| e.level == LogLevel::Error)
  }
}

/// Runs plans sequentially against a registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanExecutor;

impl PlanExecutor {
  pub fn new() -> Self {
    Self
  }

  /// Run every step of `plan` in order.
  ///
  /// Steps whose function is not registered are logged at `ERROR` and
  /// skipped. Always visits exactly `plan.len()` steps.
  #[instrument(
    name = "plan_execute",
    skip(self, plan, registry),
    fields(target = %plan.target(), steps = plan.len())
  )]
  pub fn execute(&self, plan: &ExecutionPlan, registry: &FunctionRegistry) -> ExecutionReport {
    let mut run = PlanRun::new(plan, registry);
    run.run_to_end();
    let report = run.finish();

    if !report.is_complete() {
      warn!(
        execution_id = %report.execution_id,
        missing = ?report.missing_functions,
        "plan_incomplete"
      );
    }
    info!(
      execution_id = %report.execution_id,
      executed = report.executed_functions.len(),
      "plan_executed"
    );
    report
  }
}
