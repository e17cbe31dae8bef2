use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::EmbedderError;

pub const DEFAULT_DIMENSION: usize = 256;

/// Words too common to say anything about which function is meant.
const STOP_WORDS: &[&str] = &[
  "a", "an", "and", "by", "for", "i", "in", "is", "it", "me", "my", "of", "or", "please", "the",
  "to", "want", "with",
];

/// Turns text into a fixed-length vector.
pub trait Embedder: Send + Sync {
  fn dimension(&self) -> usize;

  fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

  fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
    texts.iter().map(|t| self.embed(t)).collect()
  }
}

/// Deterministic hashed bag-of-words embedding.
///
/// Each lowercase token is hashed into one of `dimension` buckets and the
/// resulting counts are L2 normalised. Text with no usable tokens embeds to
/// the zero vector.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
  dimension: usize,
}

impl HashedEmbedder {
  pub fn new(dimension: usize) -> Self {
    Self { dimension }
  }

  fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text
      .split(|c: char| !c.is_alphanumeric())
      .filter(|t| !t.is_empty())
      .map(str::to_lowercase)
      .filter(|t| !STOP_WORDS.contains(&t.as_str()))
  }
}

impl Default for HashedEmbedder {
  fn default() -> Self {
    Self::new(DEFAULT_DIMENSION)
  }
}

impl Embedder for HashedEmbedder {
  fn dimension(&self) -> usize {
    self.dimension
  }

  fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
    if self.dimension == 0 {
      return Err(EmbedderError("dimension must be non-zero".to_string()));
    }

    let mut vector = vec![0.0; self.dimension];
    for token in Self::tokens(text) {
      let mut hasher = DefaultHasher::new();
      token.hash(&mut hasher);
      let idx = (hasher.finish() % self.dimension as u64) as usize;
      vector[idx] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
      for value in vector.iter_mut() {
        *value /= norm;
      }
    }
    Ok(vector)
  }
}

/// Cosine of the angle between two vectors; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
  let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
  if norm_a == 0.0 || norm_b == 0.0 {
    0.0
  } else {
    dot / (norm_a * norm_b)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_embedding_is_deterministic() {
    let embedder = HashedEmbedder::default();
    let a = embedder.embed("Check stock availability").unwrap();
    let b = embedder.embed("check   STOCK availability!").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), DEFAULT_DIMENSION);
  }

  #[test]
  fn test_embedding_is_normalised() {
    let embedder = HashedEmbedder::new(32);
    let v = embedder.embed("create a new order").unwrap();
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
  }

  #[test]
  fn test_stop_words_only_is_zero_vector() {
    let embedder = HashedEmbedder::default();
    let v = embedder.embed("I want to, please").unwrap();
    assert!(v.iter().all(|x| *x == 0.0));
  }

  #[test]
  fn test_underscores_split_tokens() {
    let embedder = HashedEmbedder::default();
    assert_eq!(
      embedder.embed("check_stock").unwrap(),
      embedder.embed("check stock").unwrap()
    );
  }

  #[test]
  fn test_zero_dimension_fails() {
    assert!(HashedEmbedder::new(0).embed("anything").is_err());
  }

  #[test]
  fn test_cosine_similarity() {
    assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
  }
}
