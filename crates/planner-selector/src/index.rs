use planner_graph::GraphEditor;
use tracing::info;

use crate::embedder::Embedder;
use crate::error::SelectorError;
use crate::selector::function_text;

/// Compute and store an embedding for every function in the graph.
///
/// Returns the number of functions updated.
pub async fn index_embeddings<G, E>(editor: &G, embedder: &E) -> Result<usize, SelectorError>
where
  G: GraphEditor + ?Sized,
  E: Embedder + ?Sized,
{
  let functions = editor.list_functions().await?;
  let texts: Vec<String> = functions.iter().map(function_text).collect();
  let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
  let embeddings = embedder.embed_batch(&text_refs)?;

  for (node, embedding) in functions.iter().zip(&embeddings) {
    editor.update_embedding(&node.name, embedding).await?;
  }

  info!(
    functions = functions.len(),
    dimension = embedder.dimension(),
    "embeddings_indexed"
  );
  Ok(functions.len())
}
