//! Diagnostic tracing for the CLI.
//!
//! Run logs shown to the user come from the executor and agent log entries;
//! this subscriber only carries `tracing` diagnostics, filtered by
//! `RUST_LOG` (default `warn`) and written to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).compact())
    .init();
}
