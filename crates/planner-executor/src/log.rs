use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
  Input,
  Embedding,
  Selection,
  Graph,
  Exec,
  Error,
  Response,
  Info,
}

impl LogLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Input => "INPUT",
      Self::Embedding => "EMBEDDING",
      Self::Selection => "SELECTION",
      Self::Graph => "GRAPH",
      Self::Exec => "EXEC",
      Self::Error => "ERROR",
      Self::Response => "RESPONSE",
      Self::Info => "INFO",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: LogLevel,
  pub message: String,
}

impl fmt::Display for LogEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[{}] {}: {}",
      self.timestamp.format("%H:%M:%S%.3f"),
      self.level,
      self.message
    )
  }
}

/// Ordered log of a run, kept as data and mirrored to `tracing`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
  entries: Vec<LogEntry>,
}

impl ExecutionLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
    let message = message.into();
    match level {
      LogLevel::Error => error!(level = %level, "{}", message),
      _ => info!(level = %level, "{}", message),
    }
    self.entries.push(LogEntry {
      timestamp: Utc::now(),
      level,
      message,
    });
  }

  pub fn entries(&self) -> &[LogEntry] {
    &self.entries
  }

  /// Entries at the given level, in order.
  pub fn at_level(&self, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
    self.entries.iter().filter(move |e| e.level == level)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn into_entries(self) -> Vec<LogEntry> {
    self.entries
  }
}
