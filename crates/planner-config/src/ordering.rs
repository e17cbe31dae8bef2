use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the resolver orders the closure of a target function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
  /// True topological order: every function after all of its requirements,
  /// ties broken by name.
  #[default]
  Topological,
  /// Ascending by (direct dependency count, name). Only an approximation of
  /// dependency order; kept for parity with graphs planned this way.
  DependencyCount,
}

#[derive(Debug, Error)]
#[error("unknown ordering mode '{0}' (expected 'topological' or 'dependency-count')")]
pub struct ParseOrderingModeError(String);

impl FromStr for OrderingMode {
  type Err = ParseOrderingModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "topological" | "topo" => Ok(Self::Topological),
      "dependency-count" | "dependency_count" | "count" => Ok(Self::DependencyCount),
      other => Err(ParseOrderingModeError(other.to_string())),
    }
  }
}

impl fmt::Display for OrderingMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Topological => f.write_str("topological"),
      Self::DependencyCount => f.write_str("dependency-count"),
    }
  }
}
