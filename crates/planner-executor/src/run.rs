use std::collections::HashMap;

use planner_plan::{ExecutionPlan, PlanStep};
use planner_registry::FunctionRegistry;

use crate::error::MissingFunction;
use crate::executor::ExecutionReport;
use crate::log::{ExecutionLog, LogLevel};

/// What happened to a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
  Completed {
    name: String,
    result: serde_json::Value,
  },
  Missing(MissingFunction),
}

/// Invoke a single plan step and log the outcome.
///
/// `position` is 1-based. A missing function is logged at `ERROR` and
/// reported as [`StepOutcome::Missing`].
pub fn execute_step(
  registry: &FunctionRegistry,
  step: &PlanStep,
  position: usize,
  total: usize,
  log: &mut ExecutionLog,
) -> StepOutcome {
  match registry.get(&step.name) {
    Some(function) => {
      let result = function.invoke();
      log.push(
        LogLevel::Exec,
        format!("step {}/{}: {} -> {}", position, total, step.name, result),
      );
      StepOutcome::Completed {
        name: step.name.clone(),
        result,
      }
    }
    None => {
      let missing = MissingFunction {
        name: step.name.clone(),
      };
      log.push(LogLevel::Error, missing.to_string());
      StepOutcome::Missing(missing)
    }
  }
}

/// In-progress execution of a plan, one step at a time.
pub struct PlanRun<'a> {
  plan: &'a ExecutionPlan,
  registry: &'a FunctionRegistry,
  current_step: usize,
  executed: Vec<String>,
  missing: Vec<String>,
  results: HashMap<String, serde_json::Value>,
  log: ExecutionLog,
}

impl<'a> PlanRun<'a> {
  pub fn new(plan: &'a ExecutionPlan, registry: &'a FunctionRegistry) -> Self {
    Self::with_log(plan, registry, ExecutionLog::new())
  }

  /// Continue an existing log instead of starting a new one.
  pub fn with_log(
    plan: &'a ExecutionPlan,
    registry: &'a FunctionRegistry,
    log: ExecutionLog,
  ) -> Self {
    Self {
      plan,
      registry,
      current_step: 0,
      executed: Vec::new(),
      missing: Vec::new(),
      results: HashMap::new(),
      log,
    }
  }

  /// Index of the next step to run.
  pub fn current_step(&self) -> usize {
    self.current_step
  }

  pub fn next_step(&self) -> Option<&'a PlanStep> {
    self.plan.get(self.current_step)
  }

  pub fn is_finished(&self) -> bool {
    self.current_step >= self.plan.len()
  }

  pub fn log(&self) -> &ExecutionLog {
    &self.log
  }

  pub fn results(&self) -> &HashMap<String, serde_json::Value> {
    &self.results
  }

  /// Run the next step. Returns `None` once every step has been visited.
  pub fn execute_next(&mut self) -> Option<StepOutcome> {
    let step = self.next_step()?;
    self.current_step += 1;

    let outcome = execute_step(
      self.registry,
      step,
      self.current_step,
      self.plan.len(),
      &mut self.log,
    );
    match &outcome {
      StepOutcome::Completed { name, result } => {
        self.executed.push(name.clone());
        self.results.insert(name.clone(), result.clone());
      }
      StepOutcome::Missing(missing) => self.missing.push(missing.name.clone()),
    }
    Some(outcome)
  }

  /// Run every remaining step.
  pub fn run_to_end(&mut self) {
    while self.execute_next().is_some() {}
  }

  /// Close the run. Steps not yet visited are not executed.
  pub fn finish(self) -> ExecutionReport {
    ExecutionReport {
      execution_id: uuid::Uuid::new_v4().to_string(),
      target: self.plan.target().to_string(),
      executed_functions: self.executed,
      missing_functions: self.missing,
      results: self.results,
      logs: self.log.into_entries(),
    }
  }
}
