//! Agent execution result structures

use serde::{Deserialize, Serialize};

/// Result of one agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    /// Whether the run reached the finish signal
    pub success: bool,

    /// Final result text captured from the finish call
    pub final_result: String,

    /// Number of steps executed
    pub steps_executed: usize,

    /// Number of tool calls dispatched
    pub tool_calls: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl AgentExecution {
    /// Create a successful execution result
    pub fn success(
        final_result: String,
        steps_executed: usize,
        tool_calls: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            success: true,
            final_result,
            steps_executed,
            tool_calls,
            duration_ms,
        }
    }

    /// Create a failed execution result
    pub fn failure(
        error: String,
        steps_executed: usize,
        tool_calls: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            success: false,
            final_result: error,
            steps_executed,
            tool_calls,
            duration_ms,
        }
    }
}
