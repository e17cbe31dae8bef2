//! Target function selection.
//!
//! A query is embedded with an [`Embedder`] and compared against an
//! embedding of every catalog function; the most similar function becomes
//! the plan target.

mod embedder;
mod error;
mod index;
mod selector;

pub use embedder::{DEFAULT_DIMENSION, Embedder, HashedEmbedder, cosine_similarity};
pub use error::{EmbedderError, SelectorError};
pub use index::index_embeddings;
pub use selector::{FunctionSelector, Selection, function_text};
