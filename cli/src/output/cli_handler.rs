//! CLI output handler implementation

use async_trait::async_trait;
use colored::Colorize;
use relay_core::output::{AgentEvent, AgentOutput};

/// Truncation threshold for tool output shown inline
const MAX_RESULT_PREVIEW: usize = 500;

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Whether to echo tool results to the terminal
    pub show_tool_results: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self {
            show_tool_results: true,
        }
    }
}

/// Formats agent events for terminal display
pub struct CliOutputHandler {
    config: CliOutputConfig,
}

impl CliOutputHandler {
    /// Create a new CLI output handler
    pub fn new(config: CliOutputConfig) -> Self {
        Self { config }
    }

    fn preview(result: &str) -> String {
        if result.len() > MAX_RESULT_PREVIEW {
            let cut = result
                .char_indices()
                .take_while(|(i, _)| *i < MAX_RESULT_PREVIEW)
                .count();
            let head: String = result.chars().take(cut).collect();
            format!("{head}… ({} bytes)", result.len())
        } else {
            result.to_string()
        }
    }
}

impl Default for CliOutputHandler {
    fn default() -> Self {
        Self::new(CliOutputConfig::default())
    }
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(
        &self,
        event: AgentEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event {
            AgentEvent::RunStarted { task } => {
                println!("{} {}", "Task:".bold(), task);
            }

            AgentEvent::UserPrompt { .. } => {
                // The prompt is already on the operator's terminal.
            }

            AgentEvent::AssistantText { text } => {
                println!("{}", text.white());
            }

            AgentEvent::ToolCallStarted { call } => {
                println!(
                    "{} {}({})",
                    "→".cyan(),
                    call.name.cyan().bold(),
                    serde_json::to_string(&call.args).unwrap_or_default()
                );
            }

            AgentEvent::ToolCallCompleted { call, result } => {
                if self.config.show_tool_results && !result.is_empty() {
                    println!(
                        "{} {}: {}",
                        "←".green(),
                        call.name.green(),
                        Self::preview(&result).dimmed()
                    );
                }
            }

            AgentEvent::RunCompleted {
                success,
                final_result,
                steps,
                tool_calls,
            } => {
                println!();
                if success {
                    println!("{}", "Task completed".green().bold());
                    if !final_result.is_empty() {
                        println!("{final_result}");
                    }
                } else {
                    println!("{}", "Task failed".red().bold());
                    if !final_result.is_empty() {
                        println!("{final_result}");
                    }
                }
                println!(
                    "{}",
                    format!("{steps} steps, {tool_calls} tool calls").dimmed()
                );
            }
        }

        Ok(())
    }
}
