//! Human approval gate for tool execution

use async_trait::async_trait;
use serde_json::Value;

/// Confirmation seam consulted before any matched tool executes.
///
/// A negative answer short-circuits the dispatch with an empty result;
/// it is not an error. The terminal prompt implementation lives in the
/// CLI crate.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Ask whether the given call may execute
    async fn confirm(&self, name: &str, args: &Value) -> bool;
}

/// Gate that approves everything; used when confirmation is disabled
pub struct AutoApprove;

#[async_trait]
impl ApprovalGate for AutoApprove {
    async fn confirm(&self, _name: &str, _args: &Value) -> bool {
        true
    }
}
