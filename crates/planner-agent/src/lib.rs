//! The planner agent.
//!
//! An [`Agent`] takes a natural-language query through a fixed sequence of
//! stages: the query is embedded, a target function is selected, its
//! dependencies are resolved into a plan, the plan runs one step at a time,
//! and a response is rendered from the results.
//!
//! Stages are explicit ([`AgentStage`]) and all intermediate data lives in
//! [`AgentState`], so a run can be driven to completion with
//! [`Agent::run`] or advanced one stage at a time with [`Agent::advance`].

mod agent;
mod error;
mod outcome;
mod response;
mod state;

pub use agent::Agent;
pub use error::AgentError;
pub use outcome::AgentOutcome;
pub use response::Responder;
pub use state::{AgentStage, AgentState};
