use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use planner_config::{StoreLocation, StoreSettings};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Sqlite};
use tracing::debug;

use crate::error::GraphError;
use crate::node::{ClosureEntry, FunctionNode, GraphStats};
use crate::store::{GraphEditor, GraphStore};

const CLOSURE_CTE: &str = r#"
  WITH RECURSIVE closure(name) AS (
    SELECT name FROM functions WHERE name = ?
    UNION
    SELECT r.dependency FROM requires r JOIN closure c ON r.function = c.name
  )
"#;

#[derive(Debug, FromRow)]
struct FunctionRow {
  name: String,
  description: String,
  embedding: Json<Vec<f32>>,
}

impl From<FunctionRow> for FunctionNode {
  fn from(row: FunctionRow) -> Self {
    Self {
      name: row.name,
      description: row.description,
      embedding: row.embedding.0,
    }
  }
}

#[derive(Debug, FromRow)]
struct RequiresRow {
  function: String,
  dependency: String,
}

/// SQLite-backed graph store.
///
/// Every operation acquires its own pooled connection and returns it to the
/// pool when the operation finishes, including on error.
pub struct SqliteGraphStore {
  pool: SqlitePool,
}

impl SqliteGraphStore {
  /// Create a new store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open a pool for the configured database, creating the file if needed.
  pub async fn connect(settings: &StoreSettings) -> Result<Self, GraphError> {
    let options = match &settings.location {
      StoreLocation::Url(url) => {
        SqliteConnectOptions::from_str(url).map_err(|e| GraphError::Connection {
          message: format!("invalid database url '{}': {}", url, e),
        })?
      }
      // No URL parsing, so '?' or '#' in a directory name stay literal
      StoreLocation::Path(path) => SqliteConnectOptions::new().filename(path),
    }
    .create_if_missing(true)
    .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
      .max_connections(settings.max_connections)
      .connect_with(options)
      .await
      .map_err(|e| GraphError::Connection {
        message: format!("{}: {}", settings.location, e),
      })?;

    Ok(Self::new(pool))
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), GraphError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await?;
    Ok(())
  }

  /// Close the pool. Pending sessions finish first.
  pub async fn close(&self) {
    self.pool.close().await;
  }

  async fn session(&self) -> Result<PoolConnection<Sqlite>, GraphError> {
    self
      .pool
      .acquire()
      .await
      .map_err(|e| GraphError::Connection {
        message: e.to_string(),
      })
  }

  async fn function_exists(
    conn: &mut PoolConnection<Sqlite>,
    name: &str,
  ) -> Result<bool, GraphError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM functions WHERE name = ?")
      .bind(name)
      .fetch_one(&mut **conn)
      .await?;
    Ok(count > 0)
  }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
  async fn ping(&self) -> Result<(), GraphError> {
    let mut conn = self.session().await?;
    sqlx::query("SELECT 1")
      .execute(&mut *conn)
      .await
      .map_err(|e| GraphError::Connection {
        message: e.to_string(),
      })?;
    Ok(())
  }

  async fn find_node(&self, name: &str) -> Result<Option<FunctionNode>, GraphError> {
    let mut conn = self.session().await?;
    let row: Option<FunctionRow> =
      sqlx::query_as("SELECT name, description, embedding FROM functions WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(FunctionNode::from))
  }

  async fn direct_requirements(&self, name: &str) -> Result<Vec<String>, GraphError> {
    let mut conn = self.session().await?;
    let deps: Vec<String> = sqlx::query_scalar(
      "SELECT dependency FROM requires WHERE function = ? ORDER BY dependency ASC",
    )
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;
    Ok(deps)
  }

  async fn closure_including_self(&self, name: &str) -> Result<Vec<ClosureEntry>, GraphError> {
    let mut conn = self.session().await?;

    let nodes: Vec<FunctionRow> = sqlx::query_as(&format!(
      "{CLOSURE_CTE}
      SELECT f.name, f.description, f.embedding
      FROM functions f JOIN closure c ON c.name = f.name
      ORDER BY f.name ASC"
    ))
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;

    if nodes.is_empty() {
      return Ok(Vec::new());
    }

    let edges: Vec<RequiresRow> = sqlx::query_as(&format!(
      "{CLOSURE_CTE}
      SELECT r.function, r.dependency
      FROM requires r JOIN closure c ON r.function = c.name
      ORDER BY r.function ASC, r.dependency ASC"
    ))
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;

    let mut requires: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in edges {
      requires.entry(edge.function).or_default().push(edge.dependency);
    }

    debug!(target_function = %name, closure_size = nodes.len(), "closure computed");

    Ok(
      nodes
        .into_iter()
        .map(|row| {
          let deps = requires.remove(&row.name).unwrap_or_default();
          ClosureEntry {
            node: row.into(),
            requires: deps,
          }
        })
        .collect(),
    )
  }

  async fn list_functions(&self) -> Result<Vec<FunctionNode>, GraphError> {
    let mut conn = self.session().await?;
    let rows: Vec<FunctionRow> =
      sqlx::query_as("SELECT name, description, embedding FROM functions ORDER BY name ASC")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(FunctionNode::from).collect())
  }
}

#[async_trait]
impl GraphEditor for SqliteGraphStore {
  async fn clear(&self) -> Result<(), GraphError> {
    let mut tx = self.pool.begin().await.map_err(|e| GraphError::Connection {
      message: e.to_string(),
    })?;
    sqlx::query("DELETE FROM requires").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM functions").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
  }

  async fn create_function(&self, node: &FunctionNode) -> Result<(), GraphError> {
    let mut conn = self.session().await?;
    let result =
      sqlx::query("INSERT INTO functions (name, description, embedding) VALUES (?, ?, ?)")
        .bind(&node.name)
        .bind(&node.description)
        .bind(Json(&node.embedding))
        .execute(&mut *conn)
        .await;

    match result {
      Ok(_) => Ok(()),
      Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
        Err(GraphError::DuplicateFunction {
          name: node.name.clone(),
        })
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn create_requires(&self, function: &str, dependency: &str) -> Result<(), GraphError> {
    let mut conn = self.session().await?;
    for name in [function, dependency] {
      if !Self::function_exists(&mut conn, name).await? {
        return Err(GraphError::UnknownFunction {
          name: name.to_string(),
        });
      }
    }

    sqlx::query("INSERT OR IGNORE INTO requires (function, dependency) VALUES (?, ?)")
      .bind(function)
      .bind(dependency)
      .execute(&mut *conn)
      .await?;
    Ok(())
  }

  async fn update_description(&self, name: &str, description: &str) -> Result<(), GraphError> {
    let mut conn = self.session().await?;
    let result =
      sqlx::query("UPDATE functions SET description = ?, embedding = '[]' WHERE name = ?")
        .bind(description)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
      return Err(GraphError::UnknownFunction {
        name: name.to_string(),
      });
    }
    Ok(())
  }

  async fn update_embedding(&self, name: &str, embedding: &[f32]) -> Result<(), GraphError> {
    let mut conn = self.session().await?;
    let result = sqlx::query("UPDATE functions SET embedding = ? WHERE name = ?")
      .bind(Json(embedding))
      .bind(name)
      .execute(&mut *conn)
      .await?;

    if result.rows_affected() == 0 {
      return Err(GraphError::UnknownFunction {
        name: name.to_string(),
      });
    }
    Ok(())
  }

  async fn stats(&self) -> Result<GraphStats, GraphError> {
    let mut conn = self.session().await?;
    let functions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM functions")
      .fetch_one(&mut *conn)
      .await?;

    let edges: Vec<RequiresRow> = sqlx::query_as(
      "SELECT function, dependency FROM requires ORDER BY function ASC, dependency ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    let requires = edges.len();
    let mut dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in edges {
      dependencies
        .entry(edge.function)
        .or_default()
        .push(edge.dependency);
    }

    Ok(GraphStats {
      functions: functions as usize,
      requires,
      dependencies,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn temp_store() -> (SqliteGraphStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let settings = StoreSettings::in_data_dir(dir.path());
    let store = SqliteGraphStore::connect(&settings).await.unwrap();
    store.migrate().await.unwrap();
    (store, dir)
  }

  async fn seed_abcd(store: &SqliteGraphStore) {
    for name in ["A", "B", "C", "D"] {
      store
        .create_function(&FunctionNode::new(name, format!("step {}", name)))
        .await
        .unwrap();
    }
    store.create_requires("C", "B").await.unwrap();
    for dep in ["A", "B", "C"] {
      store.create_requires("D", dep).await.unwrap();
    }
  }

  #[tokio::test]
  async fn test_ping() {
    let (store, _dir) = temp_store().await;
    store.ping().await.unwrap();
  }

  #[tokio::test]
  async fn test_closure_with_dependency_counts() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;

    let closure = store.closure_including_self("D").await.unwrap();
    let counts: Vec<(&str, usize)> = closure
      .iter()
      .map(|e| (e.name(), e.dependency_count()))
      .collect();
    assert_eq!(counts, vec![("A", 0), ("B", 0), ("C", 1), ("D", 3)]);

    let closure = store.closure_including_self("C").await.unwrap();
    let names: Vec<&str> = closure.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["B", "C"]);
  }

  #[tokio::test]
  async fn test_closure_of_missing_function_is_empty() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    assert!(
      store
        .closure_including_self("nope")
        .await
        .unwrap()
        .is_empty()
    );
  }

  #[tokio::test]
  async fn test_closure_terminates_on_cycle() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    store.create_requires("B", "D").await.unwrap();

    let closure = store.closure_including_self("C").await.unwrap();
    assert_eq!(closure.len(), 4);
  }

  #[tokio::test]
  async fn test_unique_name_constraint() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    let result = store.create_function(&FunctionNode::new("A", "dup")).await;
    assert!(matches!(result, Err(GraphError::DuplicateFunction { name }) if name == "A"));
  }

  #[tokio::test]
  async fn test_requires_to_unknown_function_rejected() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    let result = store.create_requires("ghost", "A").await;
    assert!(matches!(result, Err(GraphError::UnknownFunction { name }) if name == "ghost"));
  }

  #[tokio::test]
  async fn test_embedding_round_trip() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    store.update_embedding("A", &[0.25, 0.75]).await.unwrap();

    let node = store.find_node("A").await.unwrap().unwrap();
    assert_eq!(node.embedding, vec![0.25, 0.75]);
    assert!(store.find_node("B").await.unwrap().unwrap().embedding.is_empty());

    let result = store.update_embedding("ghost", &[1.0]).await;
    assert!(matches!(result, Err(GraphError::UnknownFunction { .. })));
  }

  #[tokio::test]
  async fn test_update_description_drops_stale_embedding() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;
    store.update_embedding("A", &[0.25, 0.75]).await.unwrap();

    store
      .update_description("A", "Refund payment to the customer wallet")
      .await
      .unwrap();

    let node = store.find_node("A").await.unwrap().unwrap();
    assert_eq!(node.description, "Refund payment to the customer wallet");
    assert!(node.embedding.is_empty());

    let result = store.update_description("ghost", "nothing").await;
    assert!(matches!(result, Err(GraphError::UnknownFunction { .. })));
  }

  #[tokio::test]
  async fn test_connect_to_path_with_query_characters() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let data_dir = dir.path().join("a?mode=ro");
    std::fs::create_dir_all(&data_dir).unwrap();

    let store = SqliteGraphStore::connect(&StoreSettings::in_data_dir(&data_dir))
      .await
      .unwrap();
    store.migrate().await.unwrap();
    store
      .create_function(&FunctionNode::new("A", "writable"))
      .await
      .unwrap();
    assert!(data_dir.join("graph.db").exists());
  }

  #[tokio::test]
  async fn test_stats_and_clear() {
    let (store, _dir) = temp_store().await;
    seed_abcd(&store).await;

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.functions, 4);
    assert_eq!(stats.requires, 4);
    assert_eq!(stats.dependencies["D"], vec!["A", "B", "C"]);

    store.clear().await.unwrap();
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.functions, 0);
    assert_eq!(stats.requires, 0);
  }

  #[tokio::test]
  async fn test_connect_fails_for_unreachable_database() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let settings = StoreSettings::in_data_dir(&dir.path().join("missing").join("nested"));
    let result = SqliteGraphStore::connect(&settings).await;
    assert!(matches!(result, Err(GraphError::Connection { .. })));
  }
}
