//! Cycle state shared by every PDCA phase, and the partial update each phase returns.
//!
//! Phases never mutate the state in place: they compute a [`CycleUpdate`] from the state they
//! were given plus the decoded model output, and [`CycleState::apply`] merges it.
//! `already_processed_steps` is append-only; every other present field replaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::message::Message;
use crate::state::{ToolCall, ToolResult};

use super::phase::Phase;

/// One planned unit of work. Immutable once planned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Short imperative name.
    #[serde(rename = "step")]
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub expected_outcome: String,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        details: impl Into<String>,
        expected_outcome: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
            expected_outcome: expected_outcome.into(),
        }
    }
}

/// Check's verdict on the current attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub success: bool,
    pub comments: String,
    #[serde(default)]
    pub suggestions: Option<String>,
}

/// How close the overall task is to done, as judged by Act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleStatus {
    FarFromCompletion,
    CloseToCompletion,
    Completed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::FarFromCompletion => "far from completion",
            CycleStatus::CloseToCompletion => "close to completion",
            CycleStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `_` and `-` are accepted in place of spaces.
impl FromStr for CycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(|c: char| c == '_' || c == '-', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "far from completion" => Ok(CycleStatus::FarFromCompletion),
            "close to completion" => Ok(CycleStatus::CloseToCompletion),
            "completed" => Ok(CycleStatus::Completed),
            _ => Err(format!(
                "unknown status: {} (expected far from completion, close to completion, or completed)",
                s
            )),
        }
    }
}

impl Serialize for CycleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CycleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// State of one PDCA run. Lives for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    /// Conversation input; the first user message seeds `task_description`.
    pub messages: Vec<Message>,
    /// The user's task. Set once, never changed afterwards.
    pub task_description: Option<String>,
    /// Plan queue; `next_steps[0]` is the step in flight.
    pub next_steps: Vec<Step>,
    /// History of evaluated steps, one entry per Check.
    pub already_processed_steps: Vec<Step>,
    pub step_results: Option<String>,
    pub step_obstacles: Option<String>,
    /// Do attempts on the current step.
    pub n_retries: u32,
    /// Latest Check verdict.
    pub success: bool,
    pub feedback: Option<Feedback>,
    /// Caveats the planner attached to its last plan.
    pub planning_feedback: Option<String>,
    pub current_status: Option<CycleStatus>,
    /// Running summary maintained by Act, fed to every phase.
    pub context: Option<String>,
    /// Accumulated results; only Act writes this.
    pub results: Option<String>,
    pub final_answer: Option<String>,
    /// A search has been requested during the current attempt.
    pub step_search_triggered: bool,
    /// Tool calls Do requested and Tools has not run yet.
    pub tool_calls: Vec<ToolCall>,
    /// Search output gathered for the current attempt.
    pub tool_results: Vec<ToolResult>,
    /// Tool rounds taken within the current attempt.
    pub tool_rounds: u32,
    /// Steps Act accepted without a passing Check (retry budget used up).
    pub exhausted_retries: u32,
    /// Last phase that ran.
    pub current_phase: Option<Phase>,
    /// Whether the last Do ran on the final node execution the step budget allows.
    pub is_last_step: bool,
}

impl CycleState {
    /// Fresh state for `task`: one user message, everything else at its initial value.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(task)],
            ..Self::default()
        }
    }

    /// The step in flight.
    pub fn current_step(&self) -> Option<&Step> {
        self.next_steps.first()
    }

    /// First user message, used to seed `task_description`.
    pub fn first_user_message(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::User(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Comma-joined names of the evaluated steps.
    pub fn processed_step_names(&self) -> String {
        self.already_processed_steps
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Merges `update` into the state.
    pub fn apply(&mut self, update: CycleUpdate) {
        if self.task_description.is_none() {
            if let Some(task) = update.task_description {
                self.task_description = Some(task);
            }
        }
        if let Some(v) = update.next_steps {
            self.next_steps = v;
        }
        self.already_processed_steps.extend(update.processed_steps);
        if let Some(v) = update.step_results {
            self.step_results = v;
        }
        if let Some(v) = update.step_obstacles {
            self.step_obstacles = v;
        }
        if let Some(v) = update.n_retries {
            self.n_retries = v;
        }
        if let Some(v) = update.success {
            self.success = v;
        }
        if let Some(v) = update.feedback {
            self.feedback = v;
        }
        if let Some(v) = update.planning_feedback {
            self.planning_feedback = v;
        }
        if let Some(v) = update.current_status {
            self.current_status = Some(v);
        }
        if let Some(v) = update.context {
            self.context = Some(v);
        }
        if let Some(v) = update.results {
            self.results = Some(v);
        }
        if let Some(v) = update.final_answer {
            self.final_answer = Some(v);
        }
        if let Some(v) = update.step_search_triggered {
            self.step_search_triggered = v;
        }
        if let Some(v) = update.tool_calls {
            self.tool_calls = v;
        }
        if let Some(v) = update.tool_results {
            self.tool_results = v;
        }
        if let Some(v) = update.tool_rounds {
            self.tool_rounds = v;
        }
        if let Some(v) = update.exhausted_retries {
            self.exhausted_retries = v;
        }
        if let Some(v) = update.current_phase {
            self.current_phase = Some(v);
        }
        if let Some(v) = update.is_last_step {
            self.is_last_step = v;
        }
    }

    /// Consuming variant of [`apply`](Self::apply).
    pub fn with_update(mut self, update: CycleUpdate) -> Self {
        self.apply(update);
        self
    }
}

/// Partial update returned by a phase. `None` leaves a field untouched; for clearable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleUpdate {
    /// Ignored once the state already has a task.
    pub task_description: Option<String>,
    pub next_steps: Option<Vec<Step>>,
    /// Appended to `already_processed_steps`.
    pub processed_steps: Vec<Step>,
    pub step_results: Option<Option<String>>,
    pub step_obstacles: Option<Option<String>>,
    pub n_retries: Option<u32>,
    pub success: Option<bool>,
    pub feedback: Option<Option<Feedback>>,
    pub planning_feedback: Option<Option<String>>,
    pub current_status: Option<CycleStatus>,
    pub context: Option<String>,
    pub results: Option<String>,
    pub final_answer: Option<String>,
    pub step_search_triggered: Option<bool>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub tool_results: Option<Vec<ToolResult>>,
    pub tool_rounds: Option<u32>,
    pub exhausted_retries: Option<u32>,
    pub current_phase: Option<Phase>,
    pub is_last_step: Option<bool>,
}

/// Reset applied between steps: clears the per-step fields so the next plan starts clean.
/// Applying it twice equals applying it once.
pub fn clean_step_vars() -> CycleUpdate {
    CycleUpdate {
        step_results: Some(None),
        step_obstacles: Some(None),
        n_retries: Some(0),
        success: Some(false),
        feedback: Some(None),
        step_search_triggered: Some(false),
        tool_calls: Some(Vec::new()),
        tool_results: Some(Vec::new()),
        tool_rounds: Some(0),
        current_phase: Some(Phase::Reset),
        ..CycleUpdate::default()
    }
}
