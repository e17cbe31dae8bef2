use std::fmt;

/// An executable unit of work behind a plan step.
pub trait PlanFunction: Send + Sync {
  fn name(&self) -> &str;

  fn description(&self) -> &str;

  /// Run the function and return its structured result.
  fn invoke(&self) -> serde_json::Value;
}

/// A [`PlanFunction`] backed by a closure.
pub struct FnFunction<F> {
  name: String,
  description: String,
  func: F,
}

impl<F> FnFunction<F>
where
  F: Fn() -> serde_json::Value + Send + Sync,
{
  pub fn new(name: impl Into<String>, description: impl Into<String>, func: F) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      func,
    }
  }
}

impl<F> PlanFunction for FnFunction<F>
where
  F: Fn() -> serde_json::Value + Send + Sync,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn description(&self) -> &str {
    &self.description
  }

  fn invoke(&self) -> serde_json::Value {
    (self.func)()
  }
}

impl<F> fmt::Debug for FnFunction<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnFunction")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}
