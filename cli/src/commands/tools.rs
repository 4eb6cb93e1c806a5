//! Tool listing command

use anyhow::Result;
use colored::Colorize;
use relay_core::tools::mcp::McpServerConfig;
use relay_core::tools::registry::ToolRegistry;

use crate::config::CliConfigLoader;

/// Spawn the configured MCP servers and print the merged tool registry
pub async fn tools_command(
    config_loader: CliConfigLoader,
    extra_servers: Vec<McpServerConfig>,
) -> Result<()> {
    let config = config_loader.load().await?;
    let mut server_configs = config.mcp_servers;
    server_configs.extend(extra_servers);
    let providers = super::spawn_providers(server_configs).await?;
    let registry = ToolRegistry::build(&providers, &[]).await?;

    println!("{}", "Available tools:".bold());
    for declaration in registry.declarations() {
        println!("  {} - {}", declaration.name.cyan(), declaration.description);
    }

    Ok(())
}
