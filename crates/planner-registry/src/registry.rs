use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::builtin::BuiltinFunction;
use crate::error::RegistryError;
use crate::function::{FnFunction, PlanFunction};

/// Mapping from function name to its implementation.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
  functions: BTreeMap<String, Arc<dyn PlanFunction>>,
}

impl FunctionRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry holding every built-in function.
  pub fn builtin() -> Self {
    let functions = BuiltinFunction::ALL
      .into_iter()
      .map(|f| (f.name().to_string(), Arc::new(f) as Arc<dyn PlanFunction>))
      .collect();
    Self { functions }
  }

  /// Registry holding the named built-in functions.
  ///
  /// Fails on the first name with no built-in implementation.
  pub fn from_names<I, S>(names: I) -> Result<Self, RegistryError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut registry = Self::new();
    for name in names {
      let function: BuiltinFunction = name.as_ref().parse()?;
      registry.register(function)?;
    }
    Ok(registry)
  }

  /// Add a function. Names must be unique.
  pub fn register<F: PlanFunction + 'static>(&mut self, function: F) -> Result<(), RegistryError> {
    self.register_arc(Arc::new(function))
  }

  pub fn register_arc(&mut self, function: Arc<dyn PlanFunction>) -> Result<(), RegistryError> {
    let name = function.name().to_string();
    if self.functions.contains_key(&name) {
      return Err(RegistryError::DuplicateFunction { name });
    }
    self.functions.insert(name, function);
    Ok(())
  }

  /// Add a closure-backed function.
  pub fn register_fn<F>(
    &mut self,
    name: impl Into<String>,
    description: impl Into<String>,
    func: F,
  ) -> Result<(), RegistryError>
  where
    F: Fn() -> serde_json::Value + Send + Sync + 'static,
  {
    self.register(FnFunction::new(name, description, func))
  }

  /// Remove a function, returning it if present.
  pub fn remove(&mut self, name: &str) -> Option<Arc<dyn PlanFunction>> {
    self.functions.remove(name)
  }

  pub fn get(&self, name: &str) -> Option<&dyn PlanFunction> {
    self.functions.get(name).map(|f| f.as_ref())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.functions.contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&str> {
    self.functions.keys().map(String::as_str).collect()
  }

  pub fn len(&self) -> usize {
    self.functions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.functions.is_empty()
  }

  /// Check that every given name has an implementation.
  pub fn ensure_covers<I, S>(&self, names: I) -> Result<(), RegistryError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut missing: Vec<String> = names
      .into_iter()
      .filter(|name| !self.contains(name.as_ref()))
      .map(|name| name.as_ref().to_string())
      .collect();

    if missing.is_empty() {
      return Ok(());
    }
    missing.sort();
    missing.dedup();
    Err(RegistryError::MissingFunctions { names: missing })
  }
}

impl fmt::Debug for FunctionRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FunctionRegistry")
      .field("functions", &self.names())
      .finish()
  }
}
