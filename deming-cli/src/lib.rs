//! Deming CLI library: option handling and run orchestration for the `deming` binary.
//!
//! Builds a [`PdcaRunner`](deming::PdcaRunner) from [`PdcaConfig`](deming::PdcaConfig) plus CLI
//! overrides, runs the task and returns the Markdown answer. With `verbose`, phase progress is
//! printed to stderr from the stream API.

pub mod display;
pub mod run;

pub use display::{format_event, truncate_display};
pub use run::{apply_overrides, graph_topology, run_task, run_with_runner, RunError, RunOptions};
