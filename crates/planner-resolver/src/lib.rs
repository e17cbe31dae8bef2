mod error;
mod resolver;

pub use error::ResolveError;
pub use planner_config::OrderingMode;
pub use planner_plan::{ExecutionPlan, PlanStep};
pub use resolver::{DependencyResolver, Resolver};
