use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  /// No implementation exists for this name.
  #[error("unknown function: {name}")]
  UnknownFunction { name: String },

  #[error("function already registered: {name}")]
  DuplicateFunction { name: String },

  /// Graph functions that the registry cannot execute.
  #[error("no implementation for: {}", names.join(", "))]
  MissingFunctions { names: Vec<String> },
}
