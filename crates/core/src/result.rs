use std::fmt;

use serde::{Serialize, Serializer};

use crate::catalog::PassId;
use crate::error::Position;

/// Where in a run a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The codec rejected the input before any pass ran.
    Parse,
    /// The pass at this 0-based index rejected its input.
    Pass(usize),
}

impl Step {
    /// Wire form: `-1` for parse, the pass index otherwise.
    pub fn index(self) -> i64 {
        match self {
            Step::Parse => -1,
            Step::Pass(i) => i as i64,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Parse => f.write_str("parse"),
            Step::Pass(i) => write!(f, "pass #{}", i),
        }
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.index())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<PassId>,
    pub message: String,
    /// Printed IR as of the last step that succeeded. Empty for parse failures.
    pub partial_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Outcome of one complete pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionResult {
    Success { output: String },
    Failure(Failure),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ExecutionResult::Failure(f) => Some(f),
            ExecutionResult::Success { .. } => None,
        }
    }

    /// Text to show in the output pane: the result, or the last good IR.
    pub fn output_text(&self) -> &str {
        match self {
            ExecutionResult::Success { output } => output,
            ExecutionResult::Failure(f) => &f.partial_output,
        }
    }
}
