//! Run orchestration: CLI overrides on top of [`PdcaConfig`], then invoke or stream the runner.

use std::path::PathBuf;

use deming::{
    build_pdca_runner, pdca_graph_topology, BuildError, CompilationError, CycleState, PdcaConfig,
    PdcaRunner, SearchProviderKind, StreamEvent,
};
use thiserror::Error;

use crate::display::format_event;

/// Options for running the PDCA agent from the CLI. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Task description sent to the agent.
    pub task: String,
    pub model: Option<String>,
    pub max_search_results: Option<usize>,
    pub max_retries: Option<u32>,
    pub max_tool_rounds: Option<u32>,
    pub recursion_limit: Option<usize>,
    pub search_provider: Option<SearchProviderKind>,
    /// Phase progress on stderr and node enter / exit logging.
    pub verbose: bool,
    /// Also write the answer to this file.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config: {0}")]
    Config(#[from] config::LoadError),
    #[error("build runner: {0}")]
    Build(#[from] BuildError),
    #[error("run: {0}")]
    Run(#[from] deming::RunError),
    #[error("graph: {0}")]
    Graph(#[from] CompilationError),
    #[error("write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Applies CLI overrides to `config`.
pub fn apply_overrides(mut config: PdcaConfig, opts: &RunOptions) -> PdcaConfig {
    if let Some(model) = &opts.model {
        config.model = model.clone();
    }
    if let Some(n) = opts.max_search_results {
        config.max_search_results = n;
    }
    if let Some(n) = opts.max_retries {
        config.max_retries = n;
    }
    if let Some(n) = opts.max_tool_rounds {
        config.max_tool_rounds = n;
    }
    if let Some(n) = opts.recursion_limit {
        config.recursion_limit = n;
    }
    if let Some(p) = opts.search_provider {
        config.search_provider = p;
    }
    config
}

/// Builds the runner from `config` plus overrides and runs the task.
pub async fn run_task(config: PdcaConfig, opts: &RunOptions) -> Result<String, RunError> {
    let config = apply_overrides(config, opts);
    tracing::info!(
        model = %config.model,
        search_provider = config.search_provider.as_str(),
        max_retries = config.max_retries,
        recursion_limit = config.recursion_limit,
        "starting pdca run"
    );
    let runner = build_pdca_runner(config, opts.verbose)?;
    run_with_runner(&runner, opts).await
}

/// Runs `opts.task` on an existing runner and returns the answer. With `verbose` the run is
/// streamed and progress lines go to stderr. The answer is also written to `opts.output`.
pub async fn run_with_runner(runner: &PdcaRunner, opts: &RunOptions) -> Result<String, RunError> {
    let state = if opts.verbose {
        runner
            .stream_with_callback(
                &opts.task,
                Some(|event: StreamEvent<CycleState>| {
                    if let Some(line) = format_event(&event) {
                        eprintln!("{}", line);
                    }
                }),
            )
            .await?
    } else {
        runner.invoke(&opts.task).await?
    };
    let answer = state
        .final_answer
        .ok_or(RunError::Run(deming::RunError::NoFinalAnswer))?;
    if let Some(path) = &opts.output {
        std::fs::write(path, format!("{}\n", answer)).map_err(|source| RunError::Output {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "answer written");
    }
    Ok(answer)
}

/// Text or DOT rendering of the PDCA graph.
pub fn graph_topology(dot: bool) -> Result<String, RunError> {
    Ok(pdca_graph_topology(dot)?)
}
