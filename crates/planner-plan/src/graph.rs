use std::collections::{BTreeSet, HashMap};

use crate::error::PlanError;

/// Requires relation over a fixed set of nodes.
///
/// An edge `(a, b)` means "a requires b".
#[derive(Debug, Clone)]
pub struct RequiresGraph {
  /// node -> nodes it requires, sorted.
  requirements: HashMap<String, Vec<String>>,
  /// node -> nodes that require it, sorted.
  dependents: HashMap<String, Vec<String>>,
  /// Nodes that require nothing, sorted.
  roots: Vec<String>,
}

impl RequiresGraph {
  /// Build a graph from node names and requires edges.
  ///
  /// Duplicate edges collapse into one. Edges naming a node outside `nodes`
  /// are rejected.
  pub fn new<I, S>(nodes: I, edges: &[(String, String)]) -> Result<Self, PlanError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut requirements: HashMap<String, Vec<String>> = HashMap::new();
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all nodes
    for node in nodes {
      let node = node.into();
      requirements.entry(node.clone()).or_default();
      dependents.entry(node).or_default();
    }

    let unique: BTreeSet<&(String, String)> = edges.iter().collect();
    for (from, to) in unique {
      if !requirements.contains_key(from) || !requirements.contains_key(to) {
        return Err(PlanError::InvalidEdge {
          from: from.clone(),
          to: to.clone(),
        });
      }
      if let Some(reqs) = requirements.get_mut(from) {
        reqs.push(to.clone());
      }
      if let Some(deps) = dependents.get_mut(to) {
        deps.push(from.clone());
      }
    }

    for list in requirements.values_mut().chain(dependents.values_mut()) {
      list.sort();
    }

    let mut roots: Vec<String> = requirements
      .iter()
      .filter(|(_, reqs)| reqs.is_empty())
      .map(|(id, _)| id.clone())
      .collect();
    roots.sort();

    Ok(Self {
      requirements,
      dependents,
      roots,
    })
  }

  pub fn len(&self) -> usize {
    self.requirements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.requirements.is_empty()
  }

  /// Nodes with no requirements.
  pub fn roots(&self) -> &[String] {
    &self.roots
  }

  /// Nodes the given node requires.
  pub fn requirements(&self, node: &str) -> &[String] {
    self
      .requirements
      .get(node)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Nodes that require the given node.
  pub fn dependents(&self, node: &str) -> &[String] {
    self
      .dependents
      .get(node)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Number of direct requirements (out-degree).
  pub fn dependency_count(&self, node: &str) -> usize {
    self.requirements(node).len()
  }

  /// Order nodes so that each appears after everything it requires.
  ///
  /// Among nodes whose requirements are all emitted, the smallest name goes
  /// first, so the result is deterministic.
  pub fn topological_order(&self) -> Result<Vec<String>, PlanError> {
    let mut pending: HashMap<&str, usize> = self
      .requirements
      .iter()
      .map(|(node, reqs)| (node.as_str(), reqs.len()))
      .collect();

    let mut ready: BTreeSet<&str> = self.roots.iter().map(String::as_str).collect();
    let mut order = Vec::with_capacity(self.len());

    while let Some(next) = ready.pop_first() {
      pending.remove(next);
      order.push(next.to_string());

      for dependent in self.dependents(next) {
        if let Some(count) = pending.get_mut(dependent.as_str()) {
          *count -= 1;
          if *count == 0 {
            ready.insert(dependent.as_str());
          }
        }
      }
    }

    if !pending.is_empty() {
      let mut remaining: Vec<String> = pending.keys().map(|n| n.to_string()).collect();
      remaining.sort();
      return Err(PlanError::CyclicDependency { remaining });
    }

    Ok(order)
  }

  /// Order nodes ascending by (direct dependency count, name).
  ///
  /// This matches dependency order only when out-degrees happen to respect
  /// it. A node can land before one of its own requirements when both have
  /// the same count. Cycles are not detected.
  pub fn dependency_count_order(&self) -> Vec<String> {
    let mut nodes: Vec<(usize, &str)> = self
      .requirements
      .iter()
      .map(|(node, reqs)| (reqs.len(), node.as_str()))
      .collect();
    nodes.sort();
    nodes.into_iter().map(|(_, node)| node.to_string()).collect()
  }
}
