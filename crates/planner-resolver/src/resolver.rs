use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use planner_config::OrderingMode;
use planner_graph::{ClosureEntry, GraphStore};
use planner_plan::{ExecutionPlan, PlanStep, RequiresGraph};

use crate::error::ResolveError;

/// Resolver turns a target function name into an execution plan.
#[async_trait]
pub trait Resolver: Send + Sync {
  /// Resolve a target into an ordered plan.
  ///
  /// This process:
  /// 1. Confirms the target exists in the graph
  /// 2. Collects the target and all of its transitive requirements
  /// 3. Orders them so requirements come before the functions that need them
  async fn resolve(&self, target: &str) -> Result<ExecutionPlan, ResolveError>;
}

/// Resolver backed by a graph store.
///
/// The store handle is owned by the resolver and only read from.
pub struct DependencyResolver<S: GraphStore> {
  store: S,
  ordering: OrderingMode,
}

impl<S: GraphStore> DependencyResolver<S> {
  /// Create a resolver, failing fast when the store is unreachable.
  pub async fn connect(store: S, ordering: OrderingMode) -> Result<Self, ResolveError> {
    store
      .ping()
      .await
      .map_err(|e| ResolveError::Connection {
        message: e.to_string(),
      })?;

    info!(ordering = %ordering, "graph store connected");
    Ok(Self { store, ordering })
  }

  pub fn ordering(&self) -> OrderingMode {
    self.ordering
  }

  /// Switch the ordering used by subsequent resolutions.
  pub fn with_ordering(mut self, ordering: OrderingMode) -> Self {
    self.ordering = ordering;
    self
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Order closure entries according to the configured mode.
  fn order_closure(&self, closure: &[ClosureEntry]) -> Result<Vec<String>, ResolveError> {
    let edges: Vec<(String, String)> = closure
      .iter()
      .flat_map(|entry| {
        entry
          .requires
          .iter()
          .map(move |dep| (entry.name().to_string(), dep.clone()))
      })
      .collect();

    let graph = RequiresGraph::new(closure.iter().map(|e| e.name()), &edges)?;

    match self.ordering {
      OrderingMode::Topological => Ok(graph.topological_order()?),
      OrderingMode::DependencyCount => Ok(graph.dependency_count_order()),
    }
  }

  #[instrument(name = "resolve_plan", skip(self), fields(ordering = %self.ordering))]
  async fn resolve_plan(&self, target: &str) -> Result<ExecutionPlan, ResolveError> {
    if self.store.find_node(target).await?.is_none() {
      warn!(target_function = %target, "target not found");
      return Err(ResolveError::NotFound {
        name: target.to_string(),
      });
    }

    let closure = self.store.closure_including_self(target).await?;
    if closure.is_empty() {
      warn!(target_function = %target, "empty closure");
      return Err(ResolveError::NotFound {
        name: target.to_string(),
      });
    }

    let order = self.order_closure(&closure)?;

    let descriptions: HashMap<&str, &str> = closure
      .iter()
      .map(|e| (e.name(), e.node.description.as_str()))
      .collect();

    let steps = order
      .into_iter()
      .map(|name| {
        let description = descriptions.get(name.as_str()).copied().unwrap_or_default();
        PlanStep::new(name, description)
      })
      .collect();

    let plan = ExecutionPlan::new(target, steps);
    info!(
      target_function = %target,
      steps = plan.len(),
      plan = ?plan.names(),
      "plan_resolved"
    );
    Ok(plan)
  }
}

#[async_trait]
impl<S: GraphStore> Resolver for DependencyResolver<S> {
  async fn resolve(&self, target: &str) -> Result<ExecutionPlan, ResolveError> {
    self.resolve_plan(target).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use planner_graph::{FunctionNode, GraphEditor, GraphError, MemoryGraphStore};

  /// Store that refuses every call.
  struct OfflineStore;

  #[async_trait]
  impl GraphStore for OfflineStore {
    async fn ping(&self) -> Result<(), GraphError> {
      Err(GraphError::Connection {
        message: "connection refused".to_string(),
      })
    }

    async fn find_node(&self, _name: &str) -> Result<Option<FunctionNode>, GraphError> {
      unimplemented!("not needed for tests")
    }

    async fn direct_requirements(&self, _name: &str) -> Result<Vec<String>, GraphError> {
      unimplemented!("not needed for tests")
    }

    async fn closure_including_self(
      &self,
      _name: &str,
    ) -> Result<Vec<ClosureEntry>, GraphError> {
      unimplemented!("not needed for tests")
    }

    async fn list_functions(&self) -> Result<Vec<FunctionNode>, GraphError> {
      unimplemented!("not needed for tests")
    }
  }

  async fn store_with(nodes: &[&str], requires: &[(&str, &str)]) -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    for name in nodes {
      store
        .create_function(&FunctionNode::new(*name, format!("does {}", name)))
        .await
        .unwrap();
    }
    for (function, dependency) in requires {
      store.create_requires(function, dependency).await.unwrap();
    }
    store
  }

  async fn abcd_resolver(ordering: OrderingMode) -> DependencyResolver<MemoryGraphStore> {
    let store = store_with(
      &["A", "B", "C", "D"],
      &[("C", "B"), ("D", "A"), ("D", "B"), ("D", "C")],
    )
    .await;
    DependencyResolver::connect(store, ordering).await.unwrap()
  }

  #[tokio::test]
  async fn test_resolve_abcd() {
    let resolver = abcd_resolver(OrderingMode::Topological).await;
    let plan = resolver.resolve("D").await.unwrap();

    assert_eq!(plan.target(), "D");
    assert_eq!(plan.names(), vec!["A", "B", "C", "D"]);
    assert_eq!(plan.steps()[2].description, "does C");
  }

  #[tokio::test]
  async fn test_resolve_partial_closure() {
    let resolver = abcd_resolver(OrderingMode::Topological).await;
    let plan = resolver.resolve("C").await.unwrap();
    assert_eq!(plan.names(), vec!["B", "C"]);
  }

  #[tokio::test]
  async fn test_resolve_leaf() {
    let resolver = abcd_resolver(OrderingMode::Topological).await;
    let plan = resolver.resolve("A").await.unwrap();
    assert_eq!(plan.names(), vec!["A"]);
  }

  #[tokio::test]
  async fn test_resolve_not_found() {
    let resolver = abcd_resolver(OrderingMode::Topological).await;
    let result = resolver.resolve("doesNotExist").await;
    assert!(matches!(result, Err(ResolveError::NotFound { name }) if name == "doesNotExist"));
  }

  #[tokio::test]
  async fn test_resolve_is_deterministic() {
    let resolver = abcd_resolver(OrderingMode::Topological).await;
    let first = resolver.resolve("D").await.unwrap();
    for _ in 0..5 {
      assert_eq!(resolver.resolve("D").await.unwrap(), first);
    }
  }

  #[tokio::test]
  async fn test_connect_fails_when_store_unreachable() {
    let result = DependencyResolver::connect(OfflineStore, OrderingMode::Topological).await;
    assert!(matches!(result, Err(ResolveError::Connection { .. })));
  }

  #[tokio::test]
  async fn test_cycle_reported_in_topological_mode() {
    let store = store_with(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "b")]).await;
    let resolver = DependencyResolver::connect(store, OrderingMode::Topological)
      .await
      .unwrap();

    let result = resolver.resolve("a").await;
    assert!(matches!(
      result,
      Err(ResolveError::CyclicDependency { remaining }) if remaining == vec!["a", "b", "c"]
    ));
  }

  #[tokio::test]
  async fn test_dependency_count_mode_does_not_check_cycles() {
    let store = store_with(&["a", "b"], &[("a", "b"), ("b", "a")]).await;
    let resolver = DependencyResolver::connect(store, OrderingMode::DependencyCount)
      .await
      .unwrap();

    let plan = resolver.resolve("a").await.unwrap();
    assert_eq!(plan.names(), vec!["a", "b"]);
  }

  #[tokio::test]
  async fn test_modes_diverge_on_equal_out_degree_chain() {
    // x requires y, y requires z: x and y share out-degree 1.
    let requires = [("x", "y"), ("y", "z")];
    let edges: Vec<(String, String)> = requires
      .iter()
      .map(|(a, b)| (a.to_string(), b.to_string()))
      .collect();

    let store = store_with(&["x", "y", "z"], &requires).await;
    let resolver = DependencyResolver::connect(store, OrderingMode::DependencyCount)
      .await
      .unwrap();

    let approximate = resolver.resolve("x").await.unwrap();
    assert_eq!(approximate.names(), vec!["z", "x", "y"]);
    assert!(!approximate.is_dependency_ordered(&edges));

    let resolver = resolver.with_ordering(OrderingMode::Topological);
    assert_eq!(resolver.ordering(), OrderingMode::Topological);
    let ordered = resolver.resolve("x").await.unwrap();
    assert_eq!(ordered.names(), vec!["z", "y", "x"]);
    assert!(ordered.is_dependency_ordered(&edges));
  }

  #[tokio::test]
  async fn test_modes_agree_when_counts_respect_order() {
    let faithful = abcd_resolver(OrderingMode::DependencyCount).await;
    let plan = faithful.resolve("D").await.unwrap();
    assert_eq!(plan.names(), vec!["A", "B", "C", "D"]);
  }
}
