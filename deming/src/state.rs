//! Tool request / result records shared by the LLM layer and the agent state.

use serde::{Deserialize, Serialize};

/// A single tool invocation requested by the model.
///
/// `arguments` is the raw JSON string the model produced; it is parsed when the tool runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
    /// Provider call id, echoed back in `ToolResult::call_id`.
    pub id: Option<String>,
}

/// Output of one executed tool call. Failed calls carry the error text as `content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: Option<String>,
    pub name: Option<String>,
    pub content: String,
}
