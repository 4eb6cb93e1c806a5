//! Tool providers, local callables, registry and dispatch

pub mod approval;
pub mod dispatcher;
pub mod local;
pub mod mcp;
pub mod provider;
pub mod registry;

pub use approval::{ApprovalGate, AutoApprove};
pub use dispatcher::{DispatchOutcome, ToolDispatcher};
pub use local::{CallableOutput, FinishTool, LocalCallable, FINISH_RESULT_ARG, FINISH_TOOL_NAME};
pub use mcp::{McpProvider, McpServerConfig};
pub use provider::{ProviderTool, ToolContent, ToolProvider};
pub use registry::{ToolBinding, ToolRegistry};
