//! Progress lines for `--verbose`: one line per finished phase, printed to stderr.

use deming::{CycleState, Phase, StreamEvent};

/// Max chars of model text (comments, results) shown per progress line.
pub const DISPLAY_MAX_LEN: usize = 120;

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    let suffix_len = 3;
    if max <= suffix_len {
        return s.chars().take(max).collect();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!(
        "{}{}",
        s.chars().take(max - suffix_len).collect::<String>(),
        SUFFIX
    )
}

fn single_line(s: &str) -> String {
    truncate_display(&s.split_whitespace().collect::<Vec<_>>().join(" "), DISPLAY_MAX_LEN)
}

fn query_of(arguments: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(arguments).ok()?;
    v.get("query").and_then(|q| q.as_str()).map(str::to_string)
}

/// Summary of what `phase` just did, read from the state after it.
fn phase_summary(phase: Phase, state: &CycleState) -> String {
    match phase {
        Phase::Plan => {
            let names: Vec<&str> = state.next_steps.iter().map(|s| s.name.as_str()).collect();
            format!("{} step(s): {}", names.len(), single_line(&names.join(" | ")))
        }
        Phase::Do => {
            let step = state
                .current_step()
                .map(|s| s.name.as_str())
                .unwrap_or_default();
            if let Some(call) = state.tool_calls.first() {
                let query = query_of(&call.arguments).unwrap_or_else(|| call.arguments.clone());
                format!("{}: searching for {}", step, single_line(&query))
            } else {
                format!(
                    "{} (attempt {}): {}",
                    step,
                    state.n_retries,
                    single_line(state.step_results.as_deref().unwrap_or_default())
                )
            }
        }
        Phase::Tools => format!("{} result set(s)", state.tool_results.len()),
        Phase::Check => {
            let verdict = if state.success { "passed" } else { "failed" };
            let comments = state
                .feedback
                .as_ref()
                .map(|f| single_line(&f.comments))
                .unwrap_or_default();
            format!("{}: {}", verdict, comments)
        }
        Phase::Act => state
            .current_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no status".to_string()),
        Phase::Reset => "step variables cleared".to_string(),
        Phase::Finalize => "answer ready".to_string(),
    }
}

/// Formats one stream event as a progress line, or `None` for events not shown.
///
/// `Updates` give `[Label] summary`; a failed task gives `[node] failed: error`, and a run that
/// stopped with an error gives `[run] failed: error`.
pub fn format_event(event: &StreamEvent<CycleState>) -> Option<String> {
    match event {
        StreamEvent::Updates { node_id, state } => {
            let phase: Phase = node_id.parse().ok()?;
            Some(format!("[{}] {}", phase.label(), phase_summary(phase, state)))
        }
        StreamEvent::TaskEnd {
            node_id,
            result: Err(e),
        } => Some(format!("[{}] failed: {}", node_id, e)),
        StreamEvent::Failed(e) => Some(format!("[run] failed: {}", e)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deming::{AgentError, CycleStatus, Feedback, Step, ToolCall};

    fn state_with_step() -> CycleState {
        let mut state = CycleState::new("task");
        state.next_steps = vec![Step::new("Find weather", "search", "a number")];
        state
    }

    #[test]
    fn truncate_display_keeps_short_and_cuts_long() {
        assert_eq!(truncate_display("hello", 10), "hello");
        let got = truncate_display(&"é".repeat(20), 10);
        assert_eq!(got.chars().count(), 10);
        assert!(got.ends_with("..."));
    }

    #[test]
    fn plan_update_lists_steps() {
        let event = StreamEvent::Updates {
            node_id: "plan".into(),
            state: state_with_step(),
        };
        assert_eq!(
            format_event(&event).as_deref(),
            Some("[Plan] 1 step(s): Find weather")
        );
    }

    #[test]
    fn do_update_shows_pending_search_query() {
        let mut state = state_with_step();
        state.tool_calls = vec![ToolCall {
            name: "search".into(),
            arguments: r#"{"query": "weather Montevideo"}"#.into(),
            id: None,
        }];
        let event = StreamEvent::Updates {
            node_id: "do".into(),
            state,
        };
        assert_eq!(
            format_event(&event).as_deref(),
            Some("[Do] Find weather: searching for weather Montevideo")
        );
    }

    #[test]
    fn check_and_act_updates() {
        let mut state = state_with_step();
        state.feedback = Some(Feedback {
            success: false,
            comments: "no   source\ncited".into(),
            suggestions: None,
        });
        let check = StreamEvent::Updates {
            node_id: "check".into(),
            state: state.clone(),
        };
        assert_eq!(
            format_event(&check).as_deref(),
            Some("[Check] failed: no source cited")
        );

        state.current_status = Some(CycleStatus::CloseToCompletion);
        let act = StreamEvent::Updates {
            node_id: "act".into(),
            state,
        };
        assert_eq!(
            format_event(&act).as_deref(),
            Some("[Act] close to completion")
        );
    }

    #[test]
    fn failed_task_and_other_events() {
        let failed: StreamEvent<CycleState> = StreamEvent::TaskEnd {
            node_id: "check".into(),
            result: Err("parse error".into()),
        };
        assert_eq!(
            format_event(&failed).as_deref(),
            Some("[check] failed: parse error")
        );
        let start: StreamEvent<CycleState> = StreamEvent::TaskStart {
            node_id: "plan".into(),
        };
        assert!(format_event(&start).is_none());
        assert!(format_event(&StreamEvent::Values(CycleState::default())).is_none());
    }

    /// **Scenario**: a run stopped by the step budget prints one closing line.
    #[test]
    fn failed_run_is_shown() {
        let failed: StreamEvent<CycleState> = StreamEvent::Failed(AgentError::RecursionLimit(40));
        let line = format_event(&failed).unwrap();
        assert!(line.starts_with("[run] failed: "), "{}", line);
        assert!(line.contains("40"), "{}", line);
    }
}
