use planner_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("embedder error: {0}")]
pub struct EmbedderError(pub String);

#[derive(Debug, Error)]
pub enum SelectorError {
  /// There are no functions to choose from.
  #[error("function catalog is empty")]
  EmptyCatalog,

  #[error("query is empty")]
  EmptyQuery,

  #[error(transparent)]
  Embedding(#[from] EmbedderError),

  #[error(transparent)]
  Graph(#[from] GraphError),
}
