//! PDCA agent: Plan, Do, Check, Act on the state graph, with web search during Do.
//!
//! ```text
//! START -> plan -> do <-> tools
//!                  do -> check -> do (retry) | act
//!                  act -> final_answer -> END | clean_vars -> plan
//! ```
//!
//! Each phase renders a prompt from [`CycleState`], calls the model, decodes a structured reply
//! ([`structured`]) and merges a [`CycleUpdate`]. Routing lives in [`router`] as pure functions.
//!
//! # Example
//!
//! ```rust,ignore
//! use deming::agent::pdca::{build_pdca_runner, PdcaConfig};
//!
//! let config = PdcaConfig::load(None)?;
//! let runner = build_pdca_runner(config, false)?;
//! let answer = runner.run("Is the current weather common in Montevideo?").await?;
//! println!("{}", answer);
//! ```

mod build;
mod config;
mod model_call;
pub mod nodes;
mod phase;
pub mod prompts;
pub mod router;
mod runner;
mod state;
pub mod structured;

pub use build::{build_llm, build_pdca_runner, build_search_provider, BuildError};
pub use config::{
    PdcaConfig, SearchProviderKind, APP_NAME, DEFAULT_MAX_RETRIES, DEFAULT_MAX_SEARCH_RESULTS,
    DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL,
};
pub use model_call::PhaseModel;
pub use nodes::STEP_BUDGET_APOLOGY;
pub use phase::Phase;
pub use router::{route_after_act_phase, route_after_check, route_after_check_phase, route_tools_usage};
pub use runner::{build_pdca_graph, pdca_graph_topology, PdcaRunner, RunError};
pub use state::{clean_step_vars, CycleState, CycleStatus, CycleUpdate, Feedback, Step};
