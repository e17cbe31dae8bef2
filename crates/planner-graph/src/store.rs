use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GraphError;
use crate::node::{ClosureEntry, FunctionNode, GraphStats};

/// Read access to the function graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
  /// Check that the store is reachable.
  async fn ping(&self) -> Result<(), GraphError>;

  /// Look up a function by name.
  async fn find_node(&self, name: &str) -> Result<Option<FunctionNode>, GraphError>;

  /// Names the function directly requires, sorted.
  async fn direct_requirements(&self, name: &str) -> Result<Vec<String>, GraphError>;

  /// Number of outgoing requires edges of a function.
  async fn direct_dependency_count(&self, name: &str) -> Result<usize, GraphError> {
    Ok(self.direct_requirements(name).await?.len())
  }

  /// The target plus every function reachable from it over requires edges,
  /// each with its direct requirements. Empty when the target does not exist.
  ///
  /// Terminates on cyclic data; each node appears once.
  async fn closure_including_self(&self, name: &str) -> Result<Vec<ClosureEntry>, GraphError>;

  /// All functions ordered by name.
  async fn list_functions(&self) -> Result<Vec<FunctionNode>, GraphError>;
}

/// Write access to the function graph.
#[async_trait]
pub trait GraphEditor: GraphStore {
  /// Remove every function and edge.
  async fn clear(&self) -> Result<(), GraphError>;

  /// Insert a function. Names are unique.
  async fn create_function(&self, node: &FunctionNode) -> Result<(), GraphError>;

  /// Record that `function` requires `dependency`. Both must exist.
  async fn create_requires(&self, function: &str, dependency: &str) -> Result<(), GraphError>;

  /// Replace a description. The stored embedding no longer matches the text
  /// and is cleared.
  async fn update_description(&self, name: &str, description: &str) -> Result<(), GraphError>;

  async fn update_embedding(&self, name: &str, embedding: &[f32]) -> Result<(), GraphError>;

  /// Counts and the per-function dependency listing.
  async fn stats(&self) -> Result<GraphStats, GraphError>;
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
  async fn ping(&self) -> Result<(), GraphError> {
    (**self).ping().await
  }

  async fn find_node(&self, name: &str) -> Result<Option<FunctionNode>, GraphError> {
    (**self).find_node(name).await
  }

  async fn direct_requirements(&self, name: &str) -> Result<Vec<String>, GraphError> {
    (**self).direct_requirements(name).await
  }

  async fn direct_dependency_count(&self, name: &str) -> Result<usize, GraphError> {
    (**self).direct_dependency_count(name).await
  }

  async fn closure_including_self(&self, name: &str) -> Result<Vec<ClosureEntry>, GraphError> {
    (**self).closure_including_self(name).await
  }

  async fn list_functions(&self) -> Result<Vec<FunctionNode>, GraphError> {
    (**self).list_functions().await
  }
}

#[async_trait]
impl<T: GraphEditor + ?Sized> GraphEditor for Arc<T> {
  async fn clear(&self) -> Result<(), GraphError> {
    (**self).clear().await
  }

  async fn create_function(&self, node: &FunctionNode) -> Result<(), GraphError> {
    (**self).create_function(node).await
  }

  async fn create_requires(&self, function: &str, dependency: &str) -> Result<(), GraphError> {
    (**self).create_requires(function, dependency).await
  }

  async fn update_description(&self, name: &str, description: &str) -> Result<(), GraphError> {
    (**self).update_description(name, description).await
  }

  async fn update_embedding(&self, name: &str, embedding: &[f32]) -> Result<(), GraphError> {
    (**self).update_embedding(name, embedding).await
  }

  async fn stats(&self) -> Result<GraphStats, GraphError> {
    (**self).stats().await
  }
}
