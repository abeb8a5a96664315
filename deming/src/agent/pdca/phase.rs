//! The closed set of PDCA phases and their graph node ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One node of the PDCA graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "plan")]
    Plan,
    #[serde(rename = "do")]
    Do,
    #[serde(rename = "tools")]
    Tools,
    #[serde(rename = "check")]
    Check,
    #[serde(rename = "act")]
    Act,
    #[serde(rename = "clean_vars")]
    Reset,
    #[serde(rename = "final_answer")]
    Finalize,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Plan,
        Phase::Do,
        Phase::Tools,
        Phase::Check,
        Phase::Act,
        Phase::Reset,
        Phase::Finalize,
    ];

    /// Graph node id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Plan => "plan",
            Phase::Do => "do",
            Phase::Tools => "tools",
            Phase::Check => "check",
            Phase::Act => "act",
            Phase::Reset => "clean_vars",
            Phase::Finalize => "final_answer",
        }
    }

    /// Human-readable name, rendered into the system prompt and progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Plan => "Plan",
            Phase::Do => "Do",
            Phase::Tools => "Search",
            Phase::Check => "Check",
            Phase::Act => "Act",
            Phase::Reset => "Reset",
            Phase::Finalize => "Final answer",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase: {}", s))
    }
}
