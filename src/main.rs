use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use planner_agent::Agent;
use planner_config::{CatalogDef, OrderingMode, StoreSettings};
use planner_executor::{LogEntry, PlanExecutor};
use planner_graph::{GraphEditor, GraphStore, MemoryGraphStore, SqliteGraphStore, load_catalog};
use planner_registry::FunctionRegistry;
use planner_resolver::{DependencyResolver, Resolver};
use planner_selector::{FunctionSelector, HashedEmbedder, index_embeddings};

mod logging;

type Store = Arc<dyn GraphEditor>;

/// Planner - resolve a function's dependencies and run them in order
#[derive(Parser)]
#[command(name = "planner")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.planner)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Graph database URL (default: sqlite://<data-dir>/graph.db)
  #[arg(long, global = true, env = "PLANNER_DATABASE_URL")]
  database_url: Option<String>,

  /// Plan ordering: topological or dependency-count
  #[arg(long, global = true, default_value_t = OrderingMode::Topological)]
  ordering: OrderingMode,

  /// Use an in-memory graph seeded with the built-in catalog
  #[arg(long, global = true)]
  in_memory: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Clear the graph and load a function catalog
  Init {
    /// Catalog JSON file (default: built-in order flow)
    #[arg(long)]
    catalog: Option<PathBuf>,
  },

  /// Show functions and their requirements
  Graph,

  /// Print the execution plan for a function
  Plan { target: String },

  /// Resolve and execute the plan for a function
  Run { target: String },

  /// Rank functions against a query
  Select { query: String },

  /// Compute and store function embeddings
  Index,

  /// Answer a query end to end (reads stdin when no query is given)
  Ask { query: Option<String> },
}

fn main() -> Result<()> {
  logging::init();
  let cli = Cli::parse();

  let Some(command) = cli.command else {
    println!("planner - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let store = open_store(&cli.data_dir, &cli.database_url, cli.in_memory).await?;
    match command {
      Commands::Init { catalog } => init(&store, catalog).await,
      Commands::Graph => show_graph(&store).await,
      Commands::Plan { target } => plan(store, cli.ordering, &target).await,
      Commands::Run { target } => run(store, cli.ordering, &target).await,
      Commands::Select { query } => select(&store, &query).await,
      Commands::Index => index(&store).await,
      Commands::Ask { query } => ask(store, cli.ordering, query).await,
    }
  })
}

async fn open_store(
  data_dir: &Option<PathBuf>,
  database_url: &Option<String>,
  in_memory: bool,
) -> Result<Store> {
  if in_memory {
    let store = MemoryGraphStore::new();
    let catalog = CatalogDef::builtin().context("failed to parse built-in catalog")?;
    load_catalog(&store, &catalog)
      .await
      .context("failed to seed in-memory graph")?;
    return Ok(Arc::new(store));
  }

  let settings = match database_url {
    Some(url) => StoreSettings::new(url.clone()),
    None => {
      let data_dir = match data_dir {
        Some(dir) => dir.clone(),
        None => dirs::home_dir()
          .context("could not determine home directory")?
          .join(".planner"),
      };
      tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
      StoreSettings::in_data_dir(&data_dir)
    }
  };

  let store = SqliteGraphStore::connect(&settings)
    .await
    .with_context(|| format!("failed to connect to {}", settings.location))?;
  store.migrate().await.context("failed to migrate graph database")?;
  Ok(Arc::new(store))
}

async fn init(store: &Store, catalog_file: Option<PathBuf>) -> Result<()> {
  let catalog = match catalog_file {
    Some(path) => {
      let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
      CatalogDef::from_json(&content)
        .with_context(|| format!("failed to parse catalog file: {}", path.display()))?
    }
    None => CatalogDef::builtin().context("failed to parse built-in catalog")?,
  };

  eprintln!("Loading catalog: {}", catalog.name);
  let stats = load_catalog(store.as_ref(), &catalog)
    .await
    .context("failed to load catalog")?;
  print!("{}", stats);

  if let Err(e) = FunctionRegistry::builtin().ensure_covers(catalog.names()) {
    eprintln!("Warning: {}", e);
  }
  Ok(())
}

async fn show_graph(store: &Store) -> Result<()> {
  let stats = store.stats().await.context("failed to read graph")?;
  print!("{}", stats);
  Ok(())
}

async fn resolver(store: Store, ordering: OrderingMode) -> Result<DependencyResolver<Store>> {
  DependencyResolver::connect(store, ordering)
    .await
    .context("failed to connect resolver")
}

/// Builtin registry, warning about graph functions it cannot run.
async fn registry(store: &Store) -> Result<FunctionRegistry> {
  let registry = FunctionRegistry::builtin();
  let functions = store.list_functions().await.context("failed to list functions")?;
  if let Err(e) = registry.ensure_covers(functions.iter().map(|f| f.name.as_str())) {
    warn!(error = %e, "registry does not cover the graph");
  }
  Ok(registry)
}

async fn plan(store: Store, ordering: OrderingMode, target: &str) -> Result<()> {
  let resolver = resolver(store, ordering).await?;
  let plan = resolver
    .resolve(target)
    .await
    .with_context(|| format!("failed to resolve '{}'", target))?;
  eprintln!("Ordering: {}", resolver.ordering());
  print!("{}", plan);
  Ok(())
}

async fn run(store: Store, ordering: OrderingMode, target: &str) -> Result<()> {
  let registry = registry(&store).await?;
  let resolver = resolver(store, ordering).await?;
  let plan = resolver
    .resolve(target)
    .await
    .with_context(|| format!("failed to resolve '{}'", target))?;

  let report = PlanExecutor::new().execute(&plan, &registry);
  print_logs(&report.logs);
  eprintln!("Execution completed: {}", report.execution_id);
  eprintln!(
    "Functions executed: {}/{}",
    report.executed_functions.len(),
    plan.len()
  );

  let output: serde_json::Map<String, serde_json::Value> = report
    .executed_functions
    .iter()
    .filter_map(|name| Some((name.clone(), report.results.get(name)?.clone())))
    .collect();
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

async fn select(store: &Store, query: &str) -> Result<()> {
  let selector = FunctionSelector::from_store(HashedEmbedder::default(), store.as_ref())
    .await
    .context("failed to build selector")?;
  let ranked = selector.rank(query).context("failed to rank functions")?;
  for selection in ranked {
    println!("{:>7.2}%  {}", selection.confidence * 100.0, selection.name);
  }
  Ok(())
}

async fn index(store: &Store) -> Result<()> {
  let count = index_embeddings(store.as_ref(), &HashedEmbedder::default())
    .await
    .context("failed to index embeddings")?;
  println!("Indexed {} functions", count);
  Ok(())
}

async fn ask(store: Store, ordering: OrderingMode, query: Option<String>) -> Result<()> {
  let query = match query {
    Some(query) => query,
    None => read_query_from_stdin()?,
  };

  let registry = registry(&store).await?;
  let selector = FunctionSelector::from_store(HashedEmbedder::default(), store.as_ref())
    .await
    .context("failed to build selector")?;
  let resolver = resolver(store, ordering).await?;
  let agent = Agent::new(selector, resolver, registry).context("failed to create agent")?;

  let outcome = agent.run(&query).await.context("agent run failed")?;
  print_logs(&outcome.logs);
  println!("{}", outcome);
  Ok(())
}

fn print_logs(logs: &[LogEntry]) {
  for entry in logs {
    eprintln!("{}", entry);
  }
}

fn read_query_from_stdin() -> Result<String> {
  eprint!("Query: ");
  io::stderr().flush()?;
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read query from stdin")?;
  Ok(line.trim().to_string())
}
