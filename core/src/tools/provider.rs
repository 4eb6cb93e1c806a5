//! Tool provider trait and data structures

use crate::error::Result;
use async_trait::async_trait;

/// A tool as declared by a provider, in the provider's schema dialect
#[derive(Debug, Clone)]
pub struct ProviderTool {
    /// Name of the tool
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// Parameter schema in the provider's JSON-Schema-like dialect
    pub input_schema: serde_json::Value,
}

/// One content block returned by a tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContent {
    /// Text content
    Text(String),

    /// Any non-text content; the dispatcher ignores these
    Other,
}

/// An external capability source exposing a list-tools/call-tool protocol.
///
/// Owned by the driver for the duration of a run. A failure in either
/// operation is fatal for the run; there is no failover to other
/// providers.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Name of the provider, for diagnostics
    fn name(&self) -> &str;

    /// List the tools this provider exposes
    async fn list_tools(&self) -> Result<Vec<ProviderTool>>;

    /// Call a tool and return its ordered content blocks
    async fn call_tool(&self, name: &str, args: &serde_json::Value)
        -> Result<Vec<ToolContent>>;
}
