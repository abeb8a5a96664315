//! Structured decode boundary: model text in, typed phase output out.
//!
//! Models wrap JSON in Markdown fences, add a sentence before it, or break lines inside
//! strings. [`extract_json`] tolerates those; anything else is an [`AgentError::Parse`], which
//! stops the run.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AgentError;

use super::phase::Phase;
use super::state::{CycleStatus, Step};

/// Plan output: the new step queue plus optional caveats for executing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningOutput {
    pub next_steps: Vec<Step>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Do output for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoingOutput {
    pub result: String,
    #[serde(default)]
    pub obstacles: Option<String>,
}

/// Check output. `success` also accepts `"passed"` / `"failed"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckingOutput {
    #[serde(deserialize_with = "lenient_bool")]
    pub success: bool,
    pub comments: String,
    #[serde(default)]
    pub suggestions: Option<String>,
}

/// Act output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActingOutput {
    pub current_status: CycleStatus,
    pub context: String,
    pub result: String,
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "passed" | "pass" | "success" | "yes" => Ok(true),
            "false" | "failed" | "fail" | "failure" | "no" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean or passed/failed, got {:?}",
                other
            ))),
        },
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got {}",
            other
        ))),
    }
}

/// Body of a Markdown fence that wraps the whole reply (```json ... ```), if it is one.
fn strip_wrapping_fence(text: &str) -> Option<&str> {
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))?;
    Some(inner.strip_suffix("```")?.trim())
}

fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => Some(v),
        _ => None,
    }
}

/// Extracts the JSON object from model text.
///
/// Tries, in order: the reply as-is, the body of a fence wrapping the whole reply, the
/// outermost `{...}` span, and the same span with raw line breaks turned into spaces. Fences
/// inside string values are left alone.
pub fn extract_json(text: &str) -> Result<Value, String> {
    let trimmed = text.trim();
    if let Some(v) = parse_object(trimmed) {
        return Ok(v);
    }
    let fenced = strip_wrapping_fence(trimmed);
    if let Some(v) = fenced.and_then(parse_object) {
        return Ok(v);
    }
    let body = fenced.unwrap_or(trimmed);
    let span = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err("no JSON object found".to_string()),
    };
    if let Some(v) = parse_object(span) {
        return Ok(v);
    }
    let flattened = span.replace("\r\n", " ").replace('\n', " ");
    serde_json::from_str::<Value>(&flattened)
        .map_err(|e| e.to_string())
        .and_then(|v| {
            if v.is_object() {
                Ok(v)
            } else {
                Err("expected a JSON object".to_string())
            }
        })
}

/// Decodes `text` into `T`, reporting failures as `AgentError::Parse` for `phase`.
pub fn decode<T: DeserializeOwned>(phase: Phase, text: &str) -> Result<T, AgentError> {
    let parse_err = |message: String| AgentError::Parse {
        phase: phase.as_str().to_string(),
        message,
    };
    let value = extract_json(text).map_err(parse_err)?;
    serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))
}

/// Plan decode; an empty step list is rejected since Do needs a step in flight.
pub fn decode_plan(text: &str) -> Result<PlanningOutput, AgentError> {
    let out: PlanningOutput = decode(Phase::Plan, text)?;
    if out.next_steps.is_empty() {
        return Err(AgentError::Parse {
            phase: Phase::Plan.as_str().to_string(),
            message: "next_steps is empty".to_string(),
        });
    }
    Ok(out)
}
