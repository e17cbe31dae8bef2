use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the graph database lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
  /// SQLite connection URL, e.g. "sqlite::memory:" or "sqlite:///srv/graph.db?mode=ro"
  Url(String),
  /// Database file, used as-is without URL parsing.
  Path(PathBuf),
}

impl fmt::Display for StoreLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Url(url) => f.write_str(url),
      Self::Path(path) => write!(f, "{}", path.display()),
    }
  }
}

/// Connection settings for the persistent graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
  pub location: StoreLocation,

  /// Upper bound on pooled connections (sessions) open at once.
  #[serde(default = "default_max_connections")]
  pub max_connections: u32,
}

fn default_max_connections() -> u32 {
  4
}

impl StoreSettings {
  pub fn new(database_url: impl Into<String>) -> Self {
    Self {
      location: StoreLocation::Url(database_url.into()),
      max_connections: default_max_connections(),
    }
  }

  /// Settings pointing at `graph.db` inside the given data directory.
  pub fn in_data_dir(data_dir: &Path) -> Self {
    Self {
      location: StoreLocation::Path(data_dir.join("graph.db")),
      max_connections: default_max_connections(),
    }
  }
}
