//! Plan execution for the planner.
//!
//! [`PlanExecutor`] walks an [`ExecutionPlan`](planner_plan::ExecutionPlan)
//! in order and invokes each step through a
//! [`FunctionRegistry`](planner_registry::FunctionRegistry). A step with no
//! implementation is recorded in the log and skipped; the run always visits
//! every step.

mod error;
mod executor;
mod log;
mod run;

pub use error::MissingFunction;
pub use executor::{ExecutionReport, PlanExecutor};
pub use log::{ExecutionLog, LogEntry, LogLevel};
pub use run::{PlanRun, StepOutcome, execute_step};
