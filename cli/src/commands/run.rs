//! Single task execution command

use anyhow::Result;
use colored::Colorize;
use relay_core::model::gemini::GeminiClient;
use relay_core::tools::mcp::McpServerConfig;
use relay_core::AgentBuilder;
use std::sync::Arc;
use tracing::{debug, info};

use crate::approval::ConsoleApprovalGate;
use crate::config::CliConfigLoader;
use crate::output::{CliOutputConfig, CliOutputHandler};

/// Execute a single task, then optionally keep the conversation open
/// for follow-up questions.
pub async fn run_command(
    task: String,
    config_loader: CliConfigLoader,
    extra_servers: Vec<McpServerConfig>,
    max_steps: Option<usize>,
    auto_approve: bool,
    interactive: bool,
) -> Result<()> {
    let config = config_loader.load().await?;
    info!("Using model: {}", config.model.model);

    let client = Arc::new(GeminiClient::new(&config.model)?);
    let mut server_configs = config.mcp_servers;
    server_configs.extend(extra_servers);
    let providers = super::spawn_providers(server_configs).await?;

    let mut builder = AgentBuilder::new(client)
        .with_output(Box::new(CliOutputHandler::new(CliOutputConfig::default())));
    for provider in providers {
        builder = builder.with_provider(provider);
    }
    if let Some(steps) = max_steps {
        builder = builder.with_max_steps(steps);
    }
    if !auto_approve {
        builder = builder.with_approval(Box::new(ConsoleApprovalGate));
    }

    let mut agent = builder.build()?;

    debug!("Executing task: {task}");
    let execution = agent.run(&task).await?;

    if !execution.success {
        anyhow::bail!("{}", execution.final_result);
    }

    if interactive {
        followup_loop(&mut agent).await?;
    }

    Ok(())
}

/// Keep asking for follow-up questions until the operator submits an
/// empty line.
async fn followup_loop(agent: &mut relay_core::AgentCore) -> Result<()> {
    loop {
        let question: String = tokio::task::spawn_blocking(|| {
            dialoguer::Input::<String>::new()
                .with_prompt("Follow-up question (empty line to exit)".bold().to_string())
                .allow_empty(true)
                .interact_text()
        })
        .await??;

        if question.trim().is_empty() {
            return Ok(());
        }

        let execution = agent.run_followup(question.trim()).await?;
        if !execution.success {
            println!("{}", execution.final_result.red());
        }
    }
}
