//! Agent stage machine.

use std::time::Instant;

use planner_executor::{LogLevel, StepOutcome, execute_step};
use planner_registry::FunctionRegistry;
use planner_resolver::Resolver;
use planner_selector::{Embedder, FunctionSelector, SelectorError};
use tracing::{debug, info, instrument};

use crate::error::AgentError;
use crate::outcome::AgentOutcome;
use crate::response::Responder;
use crate::state::{AgentStage, AgentState};

/// Answers a query by selecting, planning, and running functions.
pub struct Agent<R, E> {
  selector: FunctionSelector<E>,
  resolver: R,
  registry: FunctionRegistry,
  responder: Responder,
}

impl<R: Resolver, E: Embedder> Agent<R, E> {
  pub fn new(
    selector: FunctionSelector<E>,
    resolver: R,
    registry: FunctionRegistry,
  ) -> Result<Self, AgentError> {
    Ok(Self {
      selector,
      resolver,
      registry,
      responder: Responder::new()?,
    })
  }

  pub fn registry(&self) -> &FunctionRegistry {
    &self.registry
  }

  pub fn resolver(&self) -> &R {
    &self.resolver
  }

  /// Drive a query through every stage.
  #[instrument(name = "agent_run", skip(self), fields(query = %query))]
  pub async fn run(&self, query: &str) -> Result<AgentOutcome, AgentError> {
    let started = Instant::now();
    let mut state = AgentState::new(query);
    while !state.is_done() {
      self.advance(&mut state).await?;
    }

    let outcome = AgentOutcome::from_state(state, started.elapsed())?;
    info!(
      target_function = %outcome.target,
      executed = outcome.executed_functions.len(),
      missing = outcome.missing_functions.len(),
      elapsed_ms = outcome.elapsed.as_millis() as u64,
      "agent_completed"
    );
    Ok(outcome)
  }

  /// Run the current stage and move to the next one. No-op once done.
  pub async fn advance(&self, state: &mut AgentState) -> Result<(), AgentError> {
    let stage = state.stage;
    if stage == AgentStage::Done {
      return Ok(());
    }
    state.history.push(stage);

    let next = match stage {
      AgentStage::ReceiveInput => self.receive_input(state)?,
      AgentStage::GenerateEmbedding => self.generate_embedding(state)?,
      AgentStage::SelectFunction => self.select_function(state)?,
      AgentStage::ResolveDependencies => self.resolve_dependencies(state).await?,
      AgentStage::ExecuteStep => self.run_step(state)?,
      AgentStage::GenerateResponse => self.generate_response(state)?,
      AgentStage::Done => AgentStage::Done,
    };

    debug!(from = %stage, to = %next, "stage_transition");
    state.stage = next;
    Ok(())
  }

  fn receive_input(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    let query = state.query.trim();
    if query.is_empty() {
      state.log.push(LogLevel::Error, "empty query");
      return Err(SelectorError::EmptyQuery.into());
    }
    state.query = query.to_string();
    state.log.push(LogLevel::Input, format!("query received: '{}'", state.query));
    Ok(AgentStage::GenerateEmbedding)
  }

  fn generate_embedding(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    state.log.push(LogLevel::Embedding, "generating query embedding");
    let embedding = self.selector.embed_query(&state.query)?;
    state.log.push(
      LogLevel::Embedding,
      format!("embedding generated ({} dimensions)", embedding.len()),
    );
    state.query_embedding = Some(embedding);
    Ok(AgentStage::SelectFunction)
  }

  fn select_function(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    state.log.push(
      LogLevel::Selection,
      format!("semantic search over {} functions", self.selector.len()),
    );
    let embedding = state
      .query_embedding
      .as_deref()
      .ok_or(AgentError::InvalidState {
        stage: AgentStage::SelectFunction,
        field: "query_embedding",
      })?;

    let selection = self.selector.select_embedded(embedding)?;
    state.log.push(LogLevel::Selection, format!("target function: {}", selection));
    state.selection = Some(selection);
    Ok(AgentStage::ResolveDependencies)
  }

  async fn resolve_dependencies(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    let target = target_of(state, AgentStage::ResolveDependencies)?;
    state.log.push(LogLevel::Graph, format!("resolving dependencies for '{}'", target));

    let plan = match self.resolver.resolve(&target).await {
      Ok(plan) => plan,
      Err(e) => {
        state.log.push(LogLevel::Error, e.to_string());
        return Err(e.into());
      }
    };
    state.log.push(
      LogLevel::Graph,
      format!("plan generated with {} steps: {}", plan.len(), plan.names().join(" -> ")),
    );

    let next = if plan.is_empty() {
      AgentStage::GenerateResponse
    } else {
      AgentStage::ExecuteStep
    };
    state.plan = Some(plan);
    state.current_step = 0;
    Ok(next)
  }

  fn run_step(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    let plan = state.plan.as_ref().ok_or(AgentError::InvalidState {
      stage: AgentStage::ExecuteStep,
      field: "plan",
    })?;

    if let Some(step) = plan.get(state.current_step) {
      let outcome = execute_step(
        &self.registry,
        step,
        state.current_step + 1,
        plan.len(),
        &mut state.log,
      );
      match outcome {
        StepOutcome::Completed { name, result } => {
          state.executed_functions.push(name.clone());
          state.results.insert(name, result);
        }
        StepOutcome::Missing(missing) => state.missing_functions.push(missing.name),
      }
      state.current_step += 1;
    }

    if state.has_pending_steps() {
      Ok(AgentStage::ExecuteStep)
    } else {
      Ok(AgentStage::GenerateResponse)
    }
  }

  fn generate_response(&self, state: &mut AgentState) -> Result<AgentStage, AgentError> {
    let target = target_of(state, AgentStage::GenerateResponse)?;
    state.log.push(LogLevel::Response, "generating response");
    let response = self.responder.render(&state.query, &target, &state.results)?;
    state.log.push(LogLevel::Response, "response generated");
    state.response = Some(response);
    Ok(AgentStage::Done)
  }
}

fn target_of(state: &AgentState, stage: AgentStage) -> Result<String, AgentError> {
  state
    .selection
    .as_ref()
    .map(|s| s.name.clone())
    .ok_or(AgentError::InvalidState {
      stage,
      field: "selection",
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use planner_config::{CatalogDef, OrderingMode};
  use planner_graph::{GraphStore, MemoryGraphStore, load_catalog};
  use planner_plan::ExecutionPlan;
  use planner_resolver::{DependencyResolver, ResolveError};
  use planner_selector::HashedEmbedder;

  async fn agent(
    registry: FunctionRegistry,
  ) -> Agent<DependencyResolver<MemoryGraphStore>, HashedEmbedder> {
    let store = MemoryGraphStore::new();
    load_catalog(&store, &CatalogDef::builtin().unwrap())
      .await
      .unwrap();
    let catalog = store.list_functions().await.unwrap();
    let selector = FunctionSelector::new(HashedEmbedder::default(), &catalog).unwrap();
    let resolver = DependencyResolver::connect(store, OrderingMode::Topological)
      .await
      .unwrap();
    Agent::new(selector, resolver, registry).unwrap()
  }

  #[tokio::test]
  async fn test_order_query_end_to_end() {
    let agent = agent(FunctionRegistry::builtin()).await;
    let outcome = agent.run("I want to order a laptop").await.unwrap();

    assert_eq!(outcome.target, "create_order");
    assert_eq!(
      outcome.plan.names(),
      vec![
        "get_customer_info",
        "get_product_info",
        "calculate_total_price",
        "check_stock",
        "create_order",
      ]
    );
    assert_eq!(outcome.executed_functions, outcome.plan.names());
    assert!(outcome.missing_functions.is_empty());
    assert!(outcome.response.contains("#ORD-78901"));
  }

  #[tokio::test]
  async fn test_stages_run_in_order() {
    let agent = agent(FunctionRegistry::builtin()).await;
    let mut state = AgentState::new("is the laptop in stock?");
    while !state.is_done() {
      agent.advance(&mut state).await.unwrap();
    }

    let mut expected = vec![
      AgentStage::ReceiveInput,
      AgentStage::GenerateEmbedding,
      AgentStage::SelectFunction,
      AgentStage::ResolveDependencies,
    ];
    // check_stock requires get_product_info
    expected.extend([AgentStage::ExecuteStep; 2]);
    expected.push(AgentStage::GenerateResponse);
    assert_eq!(state.history, expected);

    // Advancing a finished run changes nothing
    agent.advance(&mut state).await.unwrap();
    assert_eq!(state.history.len(), expected.len());
  }

  #[tokio::test]
  async fn test_missing_function_is_logged_and_skipped() {
    let mut registry = FunctionRegistry::builtin();
    registry.remove("check_stock");
    let agent = agent(registry).await;

    let outcome = agent.run("I want to order a laptop").await.unwrap();
    assert_eq!(outcome.missing_functions, vec!["check_stock"]);
    assert_eq!(outcome.executed_functions.len(), 4);
    assert!(!outcome.results.contains_key("check_stock"));

    let errors: Vec<_> = outcome
      .logs
      .iter()
      .filter(|e| e.level == LogLevel::Error)
      .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("check_stock"));
  }

  #[tokio::test]
  async fn test_empty_query_fails() {
    let agent = agent(FunctionRegistry::builtin()).await;
    let result = agent.run("   ").await;
    assert!(matches!(
      result,
      Err(AgentError::Selection(SelectorError::EmptyQuery))
    ));
  }

  struct FailingResolver;

  #[async_trait]
  impl Resolver for FailingResolver {
    async fn resolve(&self, target: &str) -> Result<ExecutionPlan, ResolveError> {
      Err(ResolveError::NotFound {
        name: target.to_string(),
      })
    }
  }

  #[tokio::test]
  async fn test_resolver_failure_is_reported() {
    let catalog = vec![planner_graph::FunctionNode::new("create_order", "Create an order")];
    let selector = FunctionSelector::new(HashedEmbedder::default(), &catalog).unwrap();
    let agent = Agent::new(selector, FailingResolver, FunctionRegistry::builtin()).unwrap();

    let mut state = AgentState::new("create an order");
    let mut result = Ok(());
    while result.is_ok() && !state.is_done() {
      result = agent.advance(&mut state).await;
    }

    assert!(matches!(
      result,
      Err(AgentError::Resolve(ResolveError::NotFound { .. }))
    ));
    assert_eq!(state.stage, AgentStage::ResolveDependencies);
    assert_eq!(state.log.at_level(LogLevel::Error).count(), 1);
  }
}
