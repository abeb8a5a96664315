//! Tools node: run every pending tool call and hand the output back to Do.
//!
//! Failures never stop the run: an invalid argument string or a failing search becomes an
//! `Error: ...` result that Do sees in its prompt.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::state::{CycleState, CycleUpdate};
use crate::error::AgentError;
use crate::graph::Node;
use crate::state::{ToolCall, ToolResult};
use crate::tool_source::ToolSource;

pub struct ToolsNode {
    tools: Arc<dyn ToolSource>,
}

impl ToolsNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self { tools }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let content = match parse_arguments(&call.arguments) {
            Ok(args) => match self.tools.call_tool(&call.name, args).await {
                Ok(content) => content.text,
                Err(e) => {
                    tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                    format!("Error: {}", e)
                }
            },
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "invalid tool arguments");
                format!("Error: invalid arguments: {}", e)
            }
        };
        ToolResult {
            call_id: call.id.clone(),
            name: Some(call.name.clone()),
            content,
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

/// Appends `new_results`, clears the pending calls and counts the round.
pub fn tool_results_update(state: &CycleState, new_results: Vec<ToolResult>) -> CycleUpdate {
    let mut tool_results = state.tool_results.clone();
    tool_results.extend(new_results);
    CycleUpdate {
        tool_results: Some(tool_results),
        tool_calls: Some(Vec::new()),
        tool_rounds: Some(state.tool_rounds + 1),
        current_phase: Some(Phase::Tools),
        ..CycleUpdate::default()
    }
}

#[async_trait]
impl Node<CycleState> for ToolsNode {
    fn id(&self) -> &str {
        Phase::Tools.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        let mut results = Vec::with_capacity(state.tool_calls.len());
        for call in &state.tool_calls {
            tracing::debug!(tool = %call.name, arguments = %call.arguments, "tool call");
            results.push(self.execute(call).await);
        }
        let update = tool_results_update(&state, results);
        Ok(state.with_update(update))
    }
}
