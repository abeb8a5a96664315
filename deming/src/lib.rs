//! # Deming
//!
//! A language-model agent that works through open-ended tasks with the Deming cycle (Plan, Do,
//! Check, Act) and web search, built on a small **state-in, state-out** graph runtime.
//!
//! ## Design principles
//!
//! - **Single state type**: the PDCA graph runs over one [`CycleState`]; every phase reads it
//!   and returns a partial [`CycleUpdate`].
//! - **One step in flight**: steps are planned as a queue and executed one at a time; Check
//!   either accepts a step, asks for a retry, or (after the retry budget) forwards it to Act.
//! - **Pure routing**: the routers in [`agent::pdca::router`] are plain functions of the state.
//! - **Fatal parse failures**: structured model output that cannot be decoded stops the run
//!   with [`AgentError::Parse`].
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`RunContext`]; build and run state graphs.
//! - [`agent`]: [`agent::pdca`], the PDCA nodes, router, [`PdcaRunner`] and [`PdcaConfig`].
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], [`ChatOpenAI`].
//! - [`tool_source`]: [`ToolSource`], [`ToolSpec`], [`MockToolSource`].
//! - [`tools`]: web search ([`SearchProvider`], [`TavilySearch`], [`ExaSearch`], [`SearchToolSource`]).
//! - [`state`]: [`ToolCall`], [`ToolResult`].
//! - [`message`]: [`Message`] (System / User / Assistant).
//! - [`stream`]: [`StreamEvent`], [`StreamMode`] for graph runs.
//! - [`managed`]: [`ManagedValue`], [`IsLastStep`].

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod managed;
pub mod message;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::pdca::{
    build_pdca_runner, pdca_graph_topology, BuildError, CycleState, CycleStatus, CycleUpdate,
    Feedback, PdcaConfig, PdcaRunner, Phase, RunError, SearchProviderKind, Step,
    STEP_BUDGET_APOLOGY,
};
pub use error::AgentError;
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, LoggingNodeMiddleware,
    Node, NodeMiddleware, RunContext, RunnableConfig, StateGraph, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ModelId};
pub use managed::{IsLastStep, ManagedValue};
pub use message::Message;
pub use state::{ToolCall, ToolResult};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{ExaSearch, SearchProvider, SearchResult, SearchToolSource, TavilySearch};

/// When running `cargo test -p deming`, initializes tracing from `RUST_LOG` so unit tests in
/// `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
