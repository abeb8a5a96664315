//! Prompt templates for the PDCA phases and the `{name}` renderer.
//!
//! Every phase call is one system message ([`SYSTEM_PROMPT`], or the configured override) plus
//! one human message built from the phase template. Placeholders are `{name}`; a value of
//! `None` renders as `None` so the model sees that the field is unset.

/// Default system prompt. Placeholders: `phase`, `task_description`, `context`, `system_time`,
/// `previous_feedback`, `available_tools`.
pub const SYSTEM_PROMPT: &str = r#"You are an autonomous agent that works through hard tasks with the help of web search.
You follow the Deming cycle: Plan, Do, Check, Act. Split the task into small steps a language model can carry out, execute them one at a time, judge each result and adjust the plan when needed.

**Current phase: {phase}**

Task:
- **Task description**: {task_description}

What you know so far:
- **Context**: "{context}"
- **System time (UTC)**: {system_time}
- **Feedback from the last evaluation**: "{previous_feedback}"
- **Available tools**: "{available_tools}"

What each phase is for:
1. **Plan**: set objectives and the concrete steps that reach them.
2. **Do**: carry out the current step, searching the web when information is missing.
3. **Check**: judge whether the step met its expected outcome.
4. **Act**: decide how far the whole task is from done and update the answer.

In every phase:
- The goal is the main task. When a step cannot be completed, plan around it.
- Keep answers clear, short and focused on action.
"#;

/// Plan template. Placeholders: `context`, `previous_steps`, `format_instructions`.
pub const PLAN_PROMPT: &str = r#"Break the main task into a short list of simple steps that a language model can execute one after another.

Context so far:
"{context}"

Steps already taken (do not propose them again):
```
{previous_steps}
```

Rules:
- Be concise. If one step is enough, propose one step.
- Do not add review or validation steps; evaluation happens in the Check phase.
- Only propose text work. No images, audio or video.
- Use web search inside a step when facts are needed.
- Address any problems mentioned in the context.

Example of a good plan for "Write a short report on vision transformers":
1. Outline the report sections with notes on what each should cover.
2. Write each section as its own step, searching the web as needed.
3. Assemble the sections into one report with a title, a TL;DR and a conclusion.

Example of a bad plan for the same task:
1. Write the report.
2. Evaluate the report.

Reply with a JSON object only, following this format:
{format_instructions}
"#;

/// Do template. Placeholders: `current_step`, `step_details`, `step_expected_outcome`,
/// `context`, `previous_feedback`, `planning_feedback`, `search_results`,
/// `format_instructions`.
pub const DO_PROMPT: &str = r#"Carry out this step of the plan: "{current_step}".

Details: "{step_details}".

Expected outcome: "{step_expected_outcome}".

Context so far:
"{context}"

Feedback on the previous attempt:
"{previous_feedback}"

Notes from the planner:
"{planning_feedback}"

Search results gathered for this step:
```
{search_results}
```

Instructions:
- Do only this step and present the result so the next phase can use it.
- Search the web if you need information you do not have.
- Report anything that blocked you as an obstacle.

Reply with a JSON object only, following this format:
{format_instructions}
"#;

/// Check template. Placeholders: `current_step`, `step_results`, `results`, `obstacles`,
/// `context`, `previous_feedback`, `format_instructions`.
pub const CHECK_PROMPT: &str = r#"Evaluate the result of this step: "{current_step}".

Result of the step:
```
{step_results}
```

Overall results so far:
```
{results}
```

Obstacles reported while executing the step:
```
{obstacles}
```

Context so far:
"{context}"

Feedback on the previous attempt:
"{previous_feedback}"

Decide whether the step met its objective. Point out missing or wrong information and, if the step failed, say what a retry should do differently.

Reply with a JSON object only, following this format:
{format_instructions}
"#;

/// Act template. Placeholders: `success`, `comments`, `suggestions`, `context`, `result`,
/// `step_result`, `task_description`, `format_instructions`.
pub const ACT_PROMPT: &str = r#"Assess where the main task stands after the latest step.

The evaluator judged the step successful: {success}.

Evaluator comments:
```
{comments}
```

Evaluator suggestions:
```
{suggestions}
```

Context so far:
"{context}"

Current answer to the main task:
"{result}"

Result of the latest step:
"{step_result}"

Provide:
- **current_status**: is the task "{task_description}" far from completion, close to completion, or completed?
- **context**: a short description of where things stand, for the planner.
- **result**: the updated answer to the main task built from everything gathered so far. This is the content itself (for a report, the full report), not an evaluation.

Judge the task, not the step. Do not hold out for extra polish: if no further step is needed, mark it completed.

Reply with a JSON object only, following this format:
{format_instructions}
"#;

/// Final answer template. Placeholders: `task_description`, `current_result`.
pub const FINAL_ANSWER_PROMPT: &str = r#"Write the final answer to the task below in **Markdown**.

- **Task**: "{task_description}"
- **Material gathered**: "{current_result}"

Structure:
- A `#` title (the task itself is fine).
- A short **TL;DR**.
- `##` sections with the content.
- A conclusion that answers the task directly.

Use lists, tables or code blocks where they help reading.
"#;

pub const PLAN_FORMAT_INSTRUCTIONS: &str = r#"{"next_steps": [{"step": "short imperative name of the step", "details": "what to do, precisely", "expected_outcome": "what a successful result looks like"}], "feedback": "warnings or caveats for executing the plan, or null"}"#;

pub const DO_FORMAT_INSTRUCTIONS: &str = r#"{"result": "the text output of the step", "obstacles": "problems found while executing the step, or null"}"#;

pub const CHECK_FORMAT_INSTRUCTIONS: &str = r#"{"success": true, "comments": "why the step passed or failed", "suggestions": "what to change in a retry, or null"}"#;

pub const ACT_FORMAT_INSTRUCTIONS: &str = r#"{"current_status": "far from completion | close to completion | completed", "context": "where the task stands, for the planner", "result": "the current answer to the main task"}"#;

/// Description of the tools in the system prompt.
pub const AVAILABLE_TOOLS: &str = "web search";

/// Rendered in place of an unset value.
pub const NONE_VALUE: &str = "None";

/// Replaces `{name}` placeholders in one pass. Unknown placeholders and stray braces are kept
/// as-is; substituted values are never rescanned.
pub fn render(template: &str, vars: &[(&str, Option<&str>)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (close, v.unwrap_or(NONE_VALUE)))
        });
        match substituted {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
