use planner_config::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
  /// The store could not be reached or a session could not be opened.
  #[error("graph store unreachable: {message}")]
  Connection { message: String },

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("function already exists: {name}")]
  DuplicateFunction { name: String },

  #[error("function not found: {name}")]
  UnknownFunction { name: String },

  #[error("invalid catalog: {0}")]
  Catalog(#[from] CatalogError),
}
