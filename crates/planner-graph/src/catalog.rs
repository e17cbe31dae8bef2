use planner_config::CatalogDef;
use tracing::info;

use crate::error::GraphError;
use crate::node::{FunctionNode, GraphStats};
use crate::store::GraphEditor;

/// Replace the graph contents with the given catalog.
///
/// Clears the store, creates every function, then every requires edge, and
/// returns the resulting stats.
pub async fn load_catalog<E>(editor: &E, catalog: &CatalogDef) -> Result<GraphStats, GraphError>
where
  E: GraphEditor + ?Sized,
{
  catalog.validate()?;

  editor.clear().await?;

  for function in &catalog.functions {
    editor
      .create_function(&FunctionNode::new(&function.name, &function.description))
      .await?;
  }

  for function in &catalog.functions {
    for dependency in &function.requires {
      editor.create_requires(&function.name, dependency).await?;
    }
  }

  let stats = editor.stats().await?;
  info!(
    catalog = %catalog.name,
    functions = stats.functions,
    requires = stats.requires,
    "catalog_loaded"
  );
  Ok(stats)
}
