//! Local callables and the built-in finish tool

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Name of the built-in completion callable. Invoking it is the only
/// way a run reaches its terminal state.
pub const FINISH_TOOL_NAME: &str = "finish";

/// Argument of the finish callable that carries the final result text
pub const FINISH_RESULT_ARG: &str = "task_result";

/// Result of a local callable invocation
#[derive(Debug, Clone, PartialEq)]
pub enum CallableOutput {
    /// No meaningful result
    Empty,

    /// Plain text result
    Text(String),

    /// Structured result, sent back to the model as JSON text
    Structured(Value),
}

impl CallableOutput {
    /// Normalize to the string sent back to the model
    pub fn into_text(self) -> String {
        match self {
            CallableOutput::Empty => String::new(),
            CallableOutput::Text(text) => text,
            CallableOutput::Structured(value) => value.to_string(),
        }
    }
}

/// A named in-process function exposed to the model alongside provider
/// tools
#[async_trait]
pub trait LocalCallable: Send + Sync {
    /// Name of the callable
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// Parameter schema in the provider dialect; translated like any
    /// provider schema at registry build
    fn parameters_schema(&self) -> Value;

    /// Invoke the callable
    async fn invoke(&self, args: &Value) -> Result<CallableOutput>;
}

/// The built-in completion signal.
///
/// Indistinguishable from any other tool call at dispatch time; the
/// driver watches for its name and flips the terminal state.
pub struct FinishTool;

#[async_trait]
impl LocalCallable for FinishTool {
    fn name(&self) -> &str {
        FINISH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Signal that the task is complete. Call this exactly once, when \
         no further tool calls are needed, with a summary of the outcome."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                FINISH_RESULT_ARG: {
                    "type": "string",
                    "description": "Final result or summary of the completed task"
                }
            }
        })
    }

    async fn invoke(&self, _args: &Value) -> Result<CallableOutput> {
        Ok(CallableOutput::Empty)
    }
}
