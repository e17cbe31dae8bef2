use std::fmt;

use planner_graph::{FunctionNode, GraphStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedder::{Embedder, cosine_similarity};
use crate::error::SelectorError;

/// The chosen target function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
  pub name: String,
  /// Cosine similarity clamped to `[0, 1]`.
  pub confidence: f32,
}

impl fmt::Display for Selection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({:.2}%)", self.name, self.confidence * 100.0)
  }
}

/// Text embedded for a function: its name as words, then its description.
pub fn function_text(node: &FunctionNode) -> String {
  format!("{}: {}", node.name.replace('_', " "), node.description)
}

struct Candidate {
  name: String,
  embedding: Vec<f32>,
}

/// Picks the catalog function whose description best matches a query.
pub struct FunctionSelector<E> {
  embedder: E,
  candidates: Vec<Candidate>,
}

impl<E: Embedder> FunctionSelector<E> {
  /// Embed every function of `catalog`.
  ///
  /// A stored embedding is reused when its length matches the embedder's
  /// dimension.
  pub fn new(embedder: E, catalog: &[FunctionNode]) -> Result<Self, SelectorError> {
    if catalog.is_empty() {
      return Err(SelectorError::EmptyCatalog);
    }

    let mut candidates = Vec::with_capacity(catalog.len());
    for node in catalog {
      let embedding = if node.embedding.len() == embedder.dimension() {
        node.embedding.clone()
      } else {
        embedder.embed(&function_text(node))?
      };
      candidates.push(Candidate {
        name: node.name.clone(),
        embedding,
      });
    }

    Ok(Self {
      embedder,
      candidates,
    })
  }

  /// Build a selector over every function in the store.
  pub async fn from_store<S: GraphStore + ?Sized>(
    embedder: E,
    store: &S,
  ) -> Result<Self, SelectorError> {
    let catalog = store.list_functions().await?;
    Self::new(embedder, &catalog)
  }

  pub fn len(&self) -> usize {
    self.candidates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.candidates.is_empty()
  }

  /// Most similar function. Ties go to the earlier catalog entry.
  pub fn select(&self, query: &str) -> Result<Selection, SelectorError> {
    let query_embedding = self.embed_query(query)?;
    self.select_embedded(&query_embedding)
  }

  /// Same as [`select`](Self::select) for an already embedded query.
  pub fn select_embedded(&self, query_embedding: &[f32]) -> Result<Selection, SelectorError> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in self.candidates.iter().enumerate() {
      let score = cosine_similarity(query_embedding, &candidate.embedding);
      if best.is_none_or(|(_, top)| score > top) {
        best = Some((idx, score));
      }
    }

    let (idx, score) = best.ok_or(SelectorError::EmptyCatalog)?;
    let selection = Selection {
      name: self.candidates[idx].name.clone(),
      confidence: score.clamp(0.0, 1.0),
    };
    info!(
      function = %selection.name,
      confidence = selection.confidence,
      "function_selected"
    );
    Ok(selection)
  }

  /// Every function scored against the query, best first.
  pub fn rank(&self, query: &str) -> Result<Vec<Selection>, SelectorError> {
    let query_embedding = self.embed_query(query)?;
    let mut ranked: Vec<Selection> = self
      .candidates
      .iter()
      .map(|c| Selection {
        name: c.name.clone(),
        confidence: cosine_similarity(&query_embedding, &c.embedding).clamp(0.0, 1.0),
      })
      .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(ranked)
  }

  /// Embed a user query.
  pub fn embed_query(&self, query: &str) -> Result<Vec<f32>, SelectorError> {
    if query.trim().is_empty() {
      return Err(SelectorError::EmptyQuery);
    }
    let embedding = self.embedder.embed(query)?;
    debug!(dimension = embedding.len(), "query_embedded");
    Ok(embedding)
  }
}
