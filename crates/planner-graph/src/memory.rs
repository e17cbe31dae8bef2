use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::GraphError;
use crate::node::{ClosureEntry, FunctionNode, GraphStats};
use crate::store::{GraphEditor, GraphStore};

#[derive(Debug, Default)]
struct GraphData {
  functions: BTreeMap<String, FunctionNode>,
  /// function -> names it requires
  requires: BTreeMap<String, BTreeSet<String>>,
}

impl GraphData {
  fn requirements_of(&self, name: &str) -> Vec<String> {
    self
      .requires
      .get(name)
      .map(|deps| deps.iter().cloned().collect())
      .unwrap_or_default()
  }

  fn ensure_exists(&self, name: &str) -> Result<(), GraphError> {
    if self.functions.contains_key(name) {
      Ok(())
    } else {
      Err(GraphError::UnknownFunction {
        name: name.to_string(),
      })
    }
  }
}

/// In-memory graph store.
///
/// Each call holds the lock only for its own duration.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
  data: RwLock<GraphData>,
}

impl MemoryGraphStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
  async fn ping(&self) -> Result<(), GraphError> {
    Ok(())
  }

  async fn find_node(&self, name: &str) -> Result<Option<FunctionNode>, GraphError> {
    let data = self.data.read().await;
    Ok(data.functions.get(name).cloned())
  }

  async fn direct_requirements(&self, name: &str) -> Result<Vec<String>, GraphError> {
    let data = self.data.read().await;
    Ok(data.requirements_of(name))
  }

  async fn closure_including_self(&self, name: &str) -> Result<Vec<ClosureEntry>, GraphError> {
    let data = self.data.read().await;
    if !data.functions.contains_key(name) {
      return Ok(Vec::new());
    }

    // Breadth-first walk over outgoing requires edges
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([name.to_string()]);
    while let Some(current) = queue.pop_front() {
      if !visited.insert(current.clone()) {
        continue;
      }
      for dep in data.requirements_of(&current) {
        if !visited.contains(&dep) {
          queue.push_back(dep);
        }
      }
    }

    Ok(
      visited
        .into_iter()
        .filter_map(|name| {
          data.functions.get(&name).map(|node| ClosureEntry {
            node: node.clone(),
            requires: data.requirements_of(&name),
          })
        })
        .collect(),
    )
  }

  async fn list_functions(&self) -> Result<Vec<FunctionNode>, GraphError> {
    let data = self.data.read().await;
    Ok(data.functions.values().cloned().collect())
  }
}

#[async_trait]
impl GraphEditor for MemoryGraphStore {
  async fn clear(&self) -> Result<(), GraphError> {
    let mut data = self.data.write().await;
    data.functions.clear();
    data.requires.clear();
    Ok(())
  }

  async fn create_function(&self, node: &FunctionNode) -> Result<(), GraphError> {
    let mut data = self.data.write().await;
    if data.functions.contains_key(&node.name) {
      return Err(GraphError::DuplicateFunction {
        name: node.name.clone(),
      });
    }
    data.functions.insert(node.name.clone(), node.clone());
    Ok(())
  }

  async fn create_requires(&self, function: &str, dependency: &str) -> Result<(), GraphError> {
    let mut data = self.data.write().await;
    data.ensure_exists(function)?;
    data.ensure_exists(dependency)?;
    data
      .requires
      .entry(function.to_string())
      .or_default()
      .insert(dependency.to_string());
    Ok(())
  }

  async fn update_description(&self, name: &str, description: &str) -> Result<(), GraphError> {
    let mut data = self.data.write().await;
    let node = data
      .functions
      .get_mut(name)
      .ok_or_else(|| GraphError::UnknownFunction {
        name: name.to_string(),
      })?;
    node.description = description.to_string();
    node.embedding.clear();
    Ok(())
  }

  async fn update_embedding(&self, name: &str, embedding: &[f32]) -> Result<(), GraphError> {
    let mut data = self.data.write().await;
    let node = data
      .functions
      .get_mut(name)
      .ok_or_else(|| GraphError::UnknownFunction {
        name: name.to_string(),
      })?;
    node.embedding = embedding.to_vec();
    Ok(())
  }

  async fn stats(&self) -> Result<GraphStats, GraphError> {
    let data = self.data.read().await;
    let dependencies: BTreeMap<String, Vec<String>> = data
      .requires
      .iter()
      .filter(|(_, deps)| !deps.is_empty())
      .map(|(function, deps)| (function.clone(), deps.iter().cloned().collect()))
      .collect();

    Ok(GraphStats {
      functions: data.functions.len(),
      requires: dependencies.values().map(Vec::len).sum(),
      dependencies,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn chain_store() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    for name in ["a", "b", "c", "unrelated"] {
      store
        .create_function(&FunctionNode::new(name, name.to_uppercase()))
        .await
        .unwrap();
    }
    store.create_requires("a", "b").await.unwrap();
    store.create_requires("b", "c").await.unwrap();
    store
  }

  #[tokio::test]
  async fn test_closure_follows_requires_transitively() {
    let store = chain_store().await;

    let closure = store.closure_including_self("a").await.unwrap();
    let names: Vec<&str> = closure.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let b = closure.iter().find(|e| e.name() == "b").unwrap();
    assert_eq!(b.requires, vec!["c"]);
  }

  #[tokio::test]
  async fn test_closure_of_leaf_is_itself() {
    let store = chain_store().await;
    let closure = store.closure_including_self("c").await.unwrap();
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].dependency_count(), 0);
  }

  #[tokio::test]
  async fn test_closure_of_missing_function_is_empty() {
    let store = chain_store().await;
    assert!(
      store
        .closure_including_self("ghost")
        .await
        .unwrap()
        .is_empty()
    );
  }

  #[tokio::test]
  async fn test_closure_terminates_on_cycle() {
    let store = chain_store().await;
    store.create_requires("c", "a").await.unwrap();

    let closure = store.closure_including_self("b").await.unwrap();
    assert_eq!(closure.len(), 3);
  }

  #[tokio::test]
  async fn test_duplicate_function_rejected() {
    let store = chain_store().await;
    let result = store.create_function(&FunctionNode::new("a", "again")).await;
    assert!(matches!(result, Err(GraphError::DuplicateFunction { .. })));
  }

  #[tokio::test]
  async fn test_requires_to_unknown_function_rejected() {
    let store = chain_store().await;
    let result = store.create_requires("a", "ghost").await;
    assert!(matches!(result, Err(GraphError::UnknownFunction { name }) if name == "ghost"));
  }

  #[tokio::test]
  async fn test_direct_dependency_count() {
    let store = chain_store().await;
    store.create_requires("a", "c").await.unwrap();
    assert_eq!(store.direct_dependency_count("a").await.unwrap(), 2);
    assert_eq!(store.direct_dependency_count("c").await.unwrap(), 0);
    assert_eq!(store.direct_dependency_count("ghost").await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_update_description_drops_stale_embedding() {
    let store = chain_store().await;
    store.update_embedding("a", &[0.5, 0.5]).await.unwrap();
    store
      .update_description("a", "Refund payment to the customer wallet")
      .await
      .unwrap();

    let node = store.find_node("a").await.unwrap().unwrap();
    assert_eq!(node.description, "Refund payment to the customer wallet");
    assert!(node.embedding.is_empty());
  }

  #[tokio::test]
  async fn test_updates_and_stats() {
    let store = chain_store().await;
    store.update_description("a", "First step").await.unwrap();
    store.update_embedding("a", &[0.5, 0.5]).await.unwrap();

    let node = store.find_node("a").await.unwrap().unwrap();
    assert_eq!(node.description, "First step");
    assert_eq!(node.embedding, vec![0.5, 0.5]);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.functions, 4);
    assert_eq!(stats.requires, 2);
    assert_eq!(stats.dependencies["a"], vec!["b"]);

    store.clear().await.unwrap();
    assert!(store.list_functions().await.unwrap().is_empty());
  }
}
