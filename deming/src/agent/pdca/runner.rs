//! PdcaRunner: the compiled PDCA graph with invoke, run and stream.
//!
//! Topology:
//!
//! ```text
//! START -> plan -> do -> (tools -> do)* -> check -> (do | act)
//! act -> (final_answer -> END | clean_vars -> plan)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, LoggingNodeMiddleware,
    RunnableConfig, StateGraph, END, START,
};
use crate::llm::{LlmClient, MockLlm};
use crate::stream::{StreamEvent, StreamMode};
use crate::tool_source::{MockToolSource, ToolSource};

use super::config::PdcaConfig;
use super::model_call::PhaseModel;
use super::nodes::{ActNode, CheckNode, DoNode, FinalAnswerNode, PlanNode, ResetNode, ToolsNode};
use super::phase::Phase;
use super::router::{route_after_act_phase, route_after_check, route_tools_usage};
use super::state::CycleState;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("run finished without a final answer")]
    NoFinalAnswer,
    #[error("stream ended without final state")]
    StreamEndedWithoutState,
}

fn path_map(phases: &[Phase]) -> HashMap<String, String> {
    phases
        .iter()
        .map(|p| (p.as_str().to_string(), p.as_str().to_string()))
        .collect()
}

/// Wires the seven phase nodes and their routers into an uncompiled graph.
pub fn build_pdca_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    config: Arc<PdcaConfig>,
) -> StateGraph<CycleState> {
    let model = PhaseModel::new(llm, Arc::clone(&config));
    let max_retries = config.max_retries;

    let mut graph = StateGraph::<CycleState>::new();
    graph
        .add_node(Phase::Plan.as_str(), Arc::new(PlanNode::new(model.clone())))
        .add_node(
            Phase::Do.as_str(),
            Arc::new(DoNode::new(model.clone(), Arc::clone(&tools))),
        )
        .add_node(Phase::Tools.as_str(), Arc::new(ToolsNode::new(tools)))
        .add_node(Phase::Check.as_str(), Arc::new(CheckNode::new(model.clone())))
        .add_node(Phase::Act.as_str(), Arc::new(ActNode::new(model.clone())))
        .add_node(Phase::Reset.as_str(), Arc::new(ResetNode))
        .add_node(Phase::Finalize.as_str(), Arc::new(FinalAnswerNode::new(model)))
        .add_edge(START, Phase::Plan.as_str())
        .add_edge(Phase::Plan.as_str(), Phase::Do.as_str())
        .add_conditional_edges(
            Phase::Do.as_str(),
            Arc::new(|s: &CycleState| route_tools_usage(s).as_str().to_string()),
            Some(path_map(&[Phase::Tools, Phase::Check])),
        )
        .add_edge(Phase::Tools.as_str(), Phase::Do.as_str())
        .add_conditional_edges(
            Phase::Check.as_str(),
            Arc::new(move |s: &CycleState| route_after_check(s, max_retries).as_str().to_string()),
            Some(path_map(&[Phase::Do, Phase::Act])),
        )
        .add_conditional_edges(
            Phase::Act.as_str(),
            Arc::new(|s: &CycleState| route_after_act_phase(s).as_str().to_string()),
            Some(path_map(&[Phase::Finalize, Phase::Reset])),
        )
        .add_edge(Phase::Reset.as_str(), Phase::Plan.as_str())
        .add_edge(Phase::Finalize.as_str(), END);
    graph
}

/// Text (or DOT) rendering of the PDCA topology. Needs no credentials.
pub fn pdca_graph_topology(dot: bool) -> Result<String, CompilationError> {
    let graph = build_pdca_graph(
        Arc::new(MockLlm::with_no_tool_calls("")),
        Arc::new(MockToolSource::empty()),
        Arc::new(PdcaConfig::default()),
    )
    .compile()?;
    Ok(if dot {
        generate_dot(&graph)
    } else {
        generate_text(&graph)
    })
}

pub struct PdcaRunner {
    compiled: CompiledStateGraph<CycleState>,
    config: Arc<PdcaConfig>,
}

impl PdcaRunner {
    /// Compiles the PDCA graph. With `verbose`, node enter / exit is logged.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        config: PdcaConfig,
        verbose: bool,
    ) -> Result<Self, CompilationError> {
        let config = Arc::new(config);
        let graph = build_pdca_graph(llm, tools, Arc::clone(&config));
        let graph = if verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<CycleState>::default()))
        } else {
            graph
        };
        Ok(Self {
            compiled: graph.compile()?,
            config,
        })
    }

    pub fn config(&self) -> &PdcaConfig {
        &self.config
    }

    pub fn compiled(&self) -> &CompiledStateGraph<CycleState> {
        &self.compiled
    }

    fn runnable_config(&self) -> RunnableConfig {
        RunnableConfig::with_recursion_limit(self.config.recursion_limit)
    }

    fn log_summary(state: &CycleState) {
        tracing::info!(
            processed_steps = state.already_processed_steps.len(),
            exhausted_retries = state.exhausted_retries,
            status = ?state.current_status.map(|s| s.as_str()),
            has_answer = state.final_answer.is_some(),
            "pdca run finished"
        );
    }

    /// Runs the task to completion and returns the final state.
    pub async fn invoke(&self, task: &str) -> Result<CycleState, RunError> {
        let state = self
            .compiled
            .invoke(CycleState::new(task), Some(self.runnable_config()))
            .await?;
        Self::log_summary(&state);
        Ok(state)
    }

    /// Runs the task and returns the Markdown answer.
    pub async fn run(&self, task: &str) -> Result<String, RunError> {
        self.invoke(task)
            .await?
            .final_answer
            .ok_or(RunError::NoFinalAnswer)
    }

    /// Streams the run, calling `on_event` for every event, and returns the last state.
    ///
    /// When the run stops with an error (node failure, step budget), the typed error is
    /// returned as `RunError::Execution` after the stream ends, like `invoke` does.
    pub async fn stream_with_callback<F>(
        &self,
        task: &str,
        mut on_event: Option<F>,
    ) -> Result<CycleState, RunError>
    where
        F: FnMut(StreamEvent<CycleState>),
    {
        let modes = HashSet::from([StreamMode::Tasks, StreamMode::Updates, StreamMode::Values]);
        let mut stream =
            self.compiled
                .stream(CycleState::new(task), Some(self.runnable_config()), modes);
        let mut final_state: Option<CycleState> = None;
        let mut failure: Option<AgentError> = None;
        while let Some(event) = stream.next().await {
            if let StreamEvent::Failed(e) = &event {
                failure = Some(e.clone());
            }
            if let Some(ref mut f) = on_event {
                f(event.clone());
            }
            if let StreamEvent::Values(s) = event {
                final_state = Some(s);
            }
        }
        if let Some(e) = failure {
            return Err(RunError::Execution(e));
        }
        let state = final_state.ok_or(RunError::StreamEndedWithoutState)?;
        Self::log_summary(&state);
        Ok(state)
    }
}
