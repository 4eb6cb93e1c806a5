//! CLI commands

pub mod run;
pub mod tools;

pub use run::run_command;
pub use tools::tools_command;

use anyhow::Result;
use relay_core::tools::mcp::{McpProvider, McpServerConfig};
use relay_core::tools::provider::ToolProvider;
use std::sync::Arc;
use tracing::info;

/// Spawn every configured MCP server. A server that fails to start
/// fails the whole invocation; a half-armed tool set is worse than
/// an early error.
pub async fn spawn_providers(
    configs: Vec<McpServerConfig>,
) -> Result<Vec<Arc<dyn ToolProvider>>> {
    let mut providers: Vec<Arc<dyn ToolProvider>> = Vec::with_capacity(configs.len());
    for config in configs {
        info!(server = %config.name, "Spawning MCP server");
        let provider = McpProvider::spawn(config).await?;
        providers.push(Arc::new(provider));
    }
    Ok(providers)
}
