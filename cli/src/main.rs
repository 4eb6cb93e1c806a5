//! # relay CLI
//!
//! Command-line interface for relay - a conversational tool-orchestration
//! agent.
//!
//! ## Usage
//!
//! - `relay "task description"` - Execute a single task
//! - `relay --template project-analysis` - Run a built-in task prompt
//! - `relay tools` - Show the merged tool registry
//!
//! Tool calls are confirmed on the terminal unless `--yes` is passed;
//! `--interactive` keeps the conversation open for follow-up questions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod approval;
mod commands;
mod config;
mod output;
mod prompts;

use commands::{run_command, tools_command};
use config::CliConfigLoader;

/// relay - a conversational tool-orchestration agent
#[derive(Parser)]
#[command(name = "relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drives an LLM function-calling endpoint against MCP tools")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key override
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// MCP server command to spawn, in addition to configured ones
    /// (repeatable, e.g. --mcp-server "uv run server.py")
    #[arg(long = "mcp-server")]
    mcp_servers: Vec<String>,

    /// Maximum number of steps per run
    #[arg(long)]
    max_steps: Option<usize>,

    /// Approve all tool calls without prompting
    #[arg(short, long)]
    yes: bool,

    /// Keep the conversation open for follow-up questions
    #[arg(short, long)]
    interactive: bool,

    /// Use a built-in task prompt instead of a literal task
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(prompts::names()))]
    template: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// The task to execute
    task: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the merged tool registry
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    loader
}

/// Turn repeated --mcp-server flags into server configs
fn flag_servers(flags: &[String]) -> Vec<relay_core::tools::mcp::McpServerConfig> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, flag)| {
            let command: Vec<String> =
                flag.split_whitespace().map(str::to_string).collect();
            let name = command
                .first()
                .map(|c| {
                    PathBuf::from(c)
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("server-{i}"))
                })
                .unwrap_or_else(|| format!("server-{i}"));
            if command.is_empty() {
                None
            } else {
                Some(relay_core::tools::mcp::McpServerConfig::new(name, command))
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    relay_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);
    let extra_servers = flag_servers(&cli.mcp_servers);

    let task = match (&cli.task, &cli.template) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both a task and --template");
        }
        (Some(task), None) => Some(task.clone()),
        (None, Some(template)) => {
            // value_parser already restricted this to known names
            prompts::get(template).map(str::to_string)
        }
        (None, None) => None,
    };

    match (task, cli.command) {
        (Some(task), None) => {
            run_command(
                task,
                config_loader,
                extra_servers,
                cli.max_steps,
                cli.yes,
                cli.interactive,
            )
            .await
        }
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both a task and a subcommand");
        }
        (None, Some(Commands::Tools)) => tools_command(config_loader, extra_servers).await,
        (None, None) => {
            anyhow::bail!("No task given; pass a task string or --template");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mcp_server_flags_become_configs() {
        let servers = flag_servers(&[
            "uv run ./tools/files.py".to_string(),
            "node mcp-server.js --port 0".to_string(),
        ]);

        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].name, "uv");
        assert_eq!(
            servers[0].command,
            vec!["uv", "run", "./tools/files.py"]
        );
        assert_eq!(servers[1].name, "node");
        assert_eq!(servers[1].command.len(), 4);
    }

    #[test]
    fn blank_server_flags_are_skipped() {
        assert!(flag_servers(&["   ".to_string()]).is_empty());
    }
}
