//! PDCA phase nodes. Each node renders its prompt, calls the model, decodes the reply and
//! merges a [`CycleUpdate`](super::state::CycleUpdate) computed by a pure function.

mod act_node;
mod check_node;
mod do_node;
mod final_answer_node;
mod plan_node;
mod reset_node;
mod tools_node;

pub use act_node::{act_prompt, act_update, ActNode};
pub use check_node::{check_prompt, check_update, CheckNode};
pub use do_node::{
    apology_update, do_prompt, done_update, tool_request_update, DoNode, STEP_BUDGET_APOLOGY,
};
pub use final_answer_node::{final_answer_prompt, FinalAnswerNode};
pub use plan_node::{plan_prompt, plan_update, PlanNode};
pub use reset_node::ResetNode;
pub use tools_node::{tool_results_update, ToolsNode};

use super::state::Feedback;

/// Feedback as shown to the next phase: comments, then suggestions when present.
pub(crate) fn feedback_text(feedback: Option<&Feedback>) -> Option<String> {
    feedback.map(|f| match f.suggestions.as_deref() {
        Some(s) if !s.trim().is_empty() => format!("{}\nSuggestions: {}", f.comments, s),
        _ => f.comments.clone(),
    })
}
