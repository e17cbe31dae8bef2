use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A schedulable function stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
  pub name: String,
  pub description: String,
  /// Semantic embedding of the description. Empty until indexed.
  #[serde(default)]
  pub embedding: Vec<f32>,
}

impl FunctionNode {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      embedding: Vec::new(),
    }
  }
}

/// One node of a transitive closure together with the names it directly requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureEntry {
  pub node: FunctionNode,
  /// Direct requirements, sorted by name.
  pub requires: Vec<String>,
}

impl ClosureEntry {
  pub fn name(&self) -> &str {
    &self.node.name
  }

  /// Number of outgoing requires edges.
  pub fn dependency_count(&self) -> usize {
    self.requires.len()
  }
}

/// Summary of the graph contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
  pub functions: usize,
  pub requires: usize,
  /// function name -> names it requires, only for functions with requirements.
  pub dependencies: BTreeMap<String, Vec<String>>,
}

impl fmt::Display for GraphStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Graph state:")?;
    writeln!(f, "  functions: {}", self.functions)?;
    writeln!(f, "  requires edges: {}", self.requires)?;
    if !self.dependencies.is_empty() {
      writeln!(f, "Dependencies:")?;
      for (function, deps) in &self.dependencies {
        writeln!(f, "  {} -> requires [{}]", function, deps.join(", "))?;
      }
    }
    Ok(())
  }
}
