use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ORDER_FLOW_CATALOG: &str = include_str!("../catalog/order-flow.json");

/// Errors raised while reading or checking a catalog definition.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to parse catalog: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("duplicate function name: {name}")]
  DuplicateFunction { name: String },

  #[error("function '{function}' requires unknown function '{dependency}'")]
  UnknownDependency { function: String, dependency: String },
}

/// A function as declared in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
  /// Unique function name, e.g. "create_order"
  pub name: String,

  /// Human readable description, also used for semantic selection.
  pub description: String,

  /// Names of functions that must run before this one.
  #[serde(default)]
  pub requires: Vec<String>,
}

/// A named set of functions and their requires relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDef {
  pub name: String,
  pub functions: Vec<FunctionDef>,
}

impl CatalogDef {
  /// Parse a catalog from JSON.
  pub fn from_json(content: &str) -> Result<Self, CatalogError> {
    Ok(serde_json::from_str(content)?)
  }

  /// The order-flow catalog bundled with the planner.
  pub fn builtin() -> Result<Self, CatalogError> {
    Self::from_json(ORDER_FLOW_CATALOG)
  }

  /// Get a function definition by name.
  pub fn get(&self, name: &str) -> Option<&FunctionDef> {
    self.functions.iter().find(|f| f.name == name)
  }

  /// Iterate over all function names in declaration order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.functions.iter().map(|f| f.name.as_str())
  }

  /// Check that names are unique and every requirement names a declared function.
  pub fn validate(&self) -> Result<(), CatalogError> {
    let mut names = HashSet::new();
    for function in &self.functions {
      if !names.insert(function.name.as_str()) {
        return Err(CatalogError::DuplicateFunction {
          name: function.name.clone(),
        });
      }
    }

    for function in &self.functions {
      if let Some(dependency) = function
        .requires
        .iter()
        .find(|dep| !names.contains(dep.as_str()))
      {
        return Err(CatalogError::UnknownDependency {
          function: function.name.clone(),
          dependency: dependency.clone(),
        });
      }
    }

    Ok(())
  }
}
