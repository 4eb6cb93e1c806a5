//! Observer interface for agent execution
//!
//! The driver emits structured events; rendering is an external
//! concern. The CLI crate adapts these to the terminal, tests use
//! `NullOutput` or a recording sink.

use crate::model::turn::FunctionCall;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tool call as surfaced to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallInfo {
    /// Id of the call
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as requested by the model
    pub args: serde_json::Value,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
}

impl From<&FunctionCall> for ToolCallInfo {
    fn from(call: &FunctionCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            args: call.args.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Events emitted during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// A run started with the given task
    RunStarted { task: String },

    /// A user prompt (supplied or synthesized) entered the conversation
    UserPrompt { text: String },

    /// The model produced text
    AssistantText { text: String },

    /// A tool call is about to be dispatched
    ToolCallStarted { call: ToolCallInfo },

    /// A tool call completed with the given normalized result
    ToolCallCompleted { call: ToolCallInfo, result: String },

    /// The run reached a terminal state
    RunCompleted {
        success: bool,
        final_result: String,
        steps: usize,
        tool_calls: usize,
    },
}

/// Abstract event sink for agent execution
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Emit an agent event
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: AgentEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
