//! Routing decisions between phases. Pure functions of the state.

use super::phase::Phase;
use super::state::{CycleState, CycleStatus};

/// After Do: run the pending tool calls, or go evaluate the attempt.
pub fn route_tools_usage(state: &CycleState) -> Phase {
    if state.tool_calls.is_empty() {
        Phase::Check
    } else {
        Phase::Tools
    }
}

/// After Check: Act when the step passed or its attempts are used up, otherwise retry Do.
///
/// With `max_retries = 3` a failing step gets four Do attempts (`n_retries` 1 to 4) before Act
/// runs with `success = false`.
pub fn route_after_check_phase(success: bool, n_retries: u32, max_retries: u32) -> Phase {
    if success || n_retries > max_retries {
        Phase::Act
    } else {
        Phase::Do
    }
}

/// [`route_after_check_phase`] on the state's fields.
pub fn route_after_check(state: &CycleState, max_retries: u32) -> Phase {
    route_after_check_phase(state.success, state.n_retries, max_retries)
}

/// After Act: finish when the task is completed, otherwise reset and plan again.
pub fn route_after_act_phase(state: &CycleState) -> Phase {
    match state.current_status {
        Some(CycleStatus::Completed) => Phase::Finalize,
        Some(CycleStatus::FarFromCompletion) | Some(CycleStatus::CloseToCompletion) | None => {
            Phase::Reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolCall;

    #[test]
    fn tools_iff_pending_calls() {
        let mut state = CycleState::new("t");
        assert_eq!(route_tools_usage(&state), Phase::Check);
        state.tool_calls.push(ToolCall {
            name: "search".into(),
            arguments: "{}".into(),
            id: None,
        });
        assert_eq!(route_tools_usage(&state), Phase::Tools);
    }

    /// **Scenario**: the check router is a function of (success, n_retries) only.
    #[test]
    fn check_router_truth_table() {
        for n in 0..=6 {
            assert_eq!(route_after_check_phase(true, n, 3), Phase::Act);
            let expected = if n > 3 { Phase::Act } else { Phase::Do };
            assert_eq!(route_after_check_phase(false, n, 3), expected, "n_retries={}", n);
        }
        assert_eq!(route_after_check_phase(false, 1, 0), Phase::Act);
    }

    #[test]
    fn check_router_ignores_other_fields() {
        let a = CycleState {
            success: false,
            n_retries: 2,
            ..CycleState::new("a")
        };
        let b = CycleState {
            results: Some("different".into()),
            context: Some("different".into()),
            ..a.clone()
        };
        assert_eq!(route_after_check(&a, 3), route_after_check(&b, 3));
    }

    #[test]
    fn act_router_finalizes_only_when_completed() {
        let mut state = CycleState::new("t");
        assert_eq!(route_after_act_phase(&state), Phase::Reset);
        state.current_status = Some(CycleStatus::CloseToCompletion);
        assert_eq!(route_after_act_phase(&state), Phase::Reset);
        state.current_status = Some(CycleStatus::FarFromCompletion);
        assert_eq!(route_after_act_phase(&state), Phase::Reset);
        state.current_status = Some(CycleStatus::Completed);
        assert_eq!(route_after_act_phase(&state), Phase::Finalize);
    }
}
