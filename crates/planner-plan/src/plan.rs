use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
  pub name: String,
  pub description: String,
}

impl PlanStep {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
    }
  }
}

/// Ordered steps needed to run a target function, requirements first.
///
/// Built fresh for each resolution and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
  target: String,
  steps: Vec<PlanStep>,
}

impl ExecutionPlan {
  pub fn new(target: impl Into<String>, steps: Vec<PlanStep>) -> Self {
    Self {
      target: target.into(),
      steps,
    }
  }

  /// The function this plan was resolved for.
  pub fn target(&self) -> &str {
    &self.target
  }

  pub fn steps(&self) -> &[PlanStep] {
    &self.steps
  }

  pub fn get(&self, index: usize) -> Option<&PlanStep> {
    self.steps.get(index)
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
    self.steps.iter()
  }

  /// Step names in plan order.
  pub fn names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Index of the named step.
  pub fn position(&self, name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == name)
  }

  /// Requires edges whose dependency is scheduled after its dependent.
  ///
  /// Edges with an end outside the plan are ignored.
  pub fn ordering_violations<'a>(
    &self,
    edges: &'a [(String, String)],
  ) -> Vec<&'a (String, String)> {
    edges
      .iter()
      .filter(
        |(function, dependency)| match (self.position(function), self.position(dependency)) {
          (Some(f), Some(d)) => d > f,
          _ => false,
        },
      )
      .collect()
  }

  /// True when every requires edge inside the plan points backwards.
  pub fn is_dependency_ordered(&self, edges: &[(String, String)]) -> bool {
    self.ordering_violations(edges).is_empty()
  }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
  type Item = &'a PlanStep;
  type IntoIter = std::slice::Iter<'a, PlanStep>;

  fn into_iter(self) -> Self::IntoIter {
    self.steps.iter()
  }
}

impl fmt::Display for ExecutionPlan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Execution plan for '{}':", self.target)?;
    for (i, step) in self.steps.iter().enumerate() {
      writeln!(f, "  {}. {}", i + 1, step.name)?;
      writeln!(f, "     -> {}", step.description)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan(names: &[&str]) -> ExecutionPlan {
    ExecutionPlan::new(
      *names.last().unwrap(),
      names
        .iter()
        .map(|n| PlanStep::new(*n, format!("run {}", n)))
        .collect(),
    )
  }

  fn requires(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
      .iter()
      .map(|(a, b)| (a.to_string(), b.to_string()))
      .collect()
  }

  #[test]
  fn test_accessors() {
    let plan = plan(&["A", "B", "C"]);
    assert_eq!(plan.target(), "C");
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.names(), vec!["A", "B", "C"]);
    assert_eq!(plan.position("B"), Some(1));
    assert_eq!(plan.position("Z"), None);
    assert_eq!(plan.get(0).unwrap().description, "run A");
  }

  #[test]
  fn test_ordering_violations() {
    let edges = requires(&[("C", "B"), ("B", "A"), ("C", "outside")]);
    assert!(plan(&["A", "B", "C"]).is_dependency_ordered(&edges));

    let bad = plan(&["A", "C", "B"]);
    let violations = bad.ordering_violations(&edges);
    assert_eq!(violations, vec![&("C".to_string(), "B".to_string())]);
  }

  #[test]
  fn test_display_numbers_steps() {
    let rendered = plan(&["A", "B"]).to_string();
    assert!(rendered.starts_with("Execution plan for 'B':"));
    assert!(rendered.contains("  1. A\n     -> run A"));
    assert!(rendered.contains("  2. B"));
  }

  #[test]
  fn test_serializes_steps_in_order() {
    let json = serde_json::to_value(plan(&["A", "B"])).unwrap();
    assert_eq!(json["target"], "B");
    assert_eq!(json["steps"][0]["name"], "A");
    assert_eq!(json["steps"][1]["name"], "B");
  }
}
