//! Function implementations for plan steps.
//!
//! Each catalog function name maps to one [`PlanFunction`]. The built-in
//! order flow is a closed enum, [`BuiltinFunction`], so an unknown name is a
//! configuration error at registry construction time rather than a surprise
//! during execution.

mod builtin;
mod error;
mod function;
mod registry;

pub use builtin::BuiltinFunction;
pub use error::RegistryError;
pub use function::{FnFunction, PlanFunction};
pub use registry::FunctionRegistry;
