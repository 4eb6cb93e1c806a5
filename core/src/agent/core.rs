//! The conversation driver

use crate::agent::config::AgentConfig;
use crate::agent::execution::AgentExecution;
use crate::error::Result;
use crate::model::client::ModelClient;
use crate::model::executor::TurnExecutor;
use crate::model::turn::Turn;
use crate::output::{AgentEvent, AgentOutput, ToolCallInfo};
use crate::tools::approval::ApprovalGate;
use crate::tools::dispatcher::{DispatchOutcome, ToolDispatcher};
use crate::tools::local::{LocalCallable, FINISH_RESULT_ARG, FINISH_TOOL_NAME};
use crate::tools::provider::ToolProvider;
use crate::tools::registry::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Synthetic user turn appended when the model returns neither text nor
/// function calls. An empty reply is never treated as completion.
const CONTINUE_PROMPT: &str =
    "Continue with the task, or call the finish tool if it is complete.";

/// The run loop: owns the conversation state, drives the turn executor
/// and the tool dispatcher, and terminates on the finish signal.
pub struct AgentCore {
    config: AgentConfig,
    executor: TurnExecutor,
    providers: Vec<Arc<dyn ToolProvider>>,
    callables: Vec<Arc<dyn LocalCallable>>,
    approval: Option<Box<dyn ApprovalGate>>,
    output: Box<dyn AgentOutput>,
    registry: Option<ToolRegistry>,
    history: Vec<Turn>,
    steps: usize,
    tool_calls: usize,
    finished: bool,
    final_result: Option<String>,
}

impl AgentCore {
    /// Create a new driver. Prefer `AgentBuilder`.
    pub fn new(
        config: AgentConfig,
        client: Arc<dyn ModelClient>,
        providers: Vec<Arc<dyn ToolProvider>>,
        callables: Vec<Arc<dyn LocalCallable>>,
        approval: Option<Box<dyn ApprovalGate>>,
        output: Box<dyn AgentOutput>,
    ) -> Self {
        Self {
            config,
            executor: TurnExecutor::new(client),
            providers,
            callables,
            approval,
            output,
            registry: None,
            history: Vec::new(),
            steps: 0,
            tool_calls: 0,
            finished: false,
            final_result: None,
        }
    }

    /// Conversation history so far
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Execute a task from a fresh conversation until the finish signal
    /// or the step ceiling.
    pub async fn run(&mut self, task: &str) -> Result<AgentExecution> {
        self.history.clear();
        self.steps = 0;
        self.tool_calls = 0;
        self.finished = false;
        self.final_result = None;

        if self.registry.is_none() {
            let registry = ToolRegistry::build(&self.providers, &self.callables).await?;
            info!(tools = registry.len(), "Tool registry built");
            self.registry = Some(registry);
        }

        self.emit(AgentEvent::RunStarted {
            task: task.to_string(),
        })
        .await;

        self.drive(task).await
    }

    /// Continue a finished conversation with a follow-up prompt.
    /// History and registry are kept; the finished flag is re-armed.
    pub async fn run_followup(&mut self, prompt: &str) -> Result<AgentExecution> {
        if self.registry.is_none() {
            return Err(crate::error::AgentError::TaskFailed {
                message: "run a task before asking follow-up questions".to_string(),
            }
            .into());
        }

        self.finished = false;
        self.final_result = None;
        self.drive(prompt).await
    }

    /// Step with the given prompt, then with empty prompts, until the
    /// finish signal or the step ceiling.
    async fn drive(&mut self, prompt: &str) -> Result<AgentExecution> {
        let start_time = Instant::now();
        let steps_before = self.steps;
        let tool_calls_before = self.tool_calls;

        let mut prompt = prompt;
        while !self.finished && self.steps - steps_before < self.config.max_steps {
            self.step(prompt).await?;
            prompt = "";
        }

        let steps = self.steps - steps_before;
        let tool_calls = self.tool_calls - tool_calls_before;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        let execution = if self.finished {
            AgentExecution::success(
                self.final_result.clone().unwrap_or_default(),
                steps,
                tool_calls,
                duration_ms,
            )
        } else {
            AgentExecution::failure(
                format!("Task incomplete after {steps} steps"),
                steps,
                tool_calls,
                duration_ms,
            )
        };

        self.emit(AgentEvent::RunCompleted {
            success: execution.success,
            final_result: execution.final_result.clone(),
            steps,
            tool_calls,
        })
        .await;

        Ok(execution)
    }

    /// One step: at most one model invocation plus all resulting tool
    /// dispatches, in the order the model requested them.
    async fn step(&mut self, prompt: &str) -> Result<()> {
        if !prompt.is_empty() {
            self.history.push(Turn::user(prompt));
            self.emit(AgentEvent::UserPrompt {
                text: prompt.to_string(),
            })
            .await;
        }

        self.steps += 1;
        debug!(step = self.steps, turns = self.history.len(), "Invoking model");

        // Built in run(); drive() is unreachable without it.
        let registry = self.registry.as_ref().expect("registry built before stepping");
        let reply = self
            .executor
            .execute(&self.history, registry.declarations())
            .await?;

        if reply.is_empty() {
            // The endpoint occasionally returns an empty terminal
            // response that is not a true completion signal.
            self.history.push(Turn::user(CONTINUE_PROMPT));
            self.emit(AgentEvent::UserPrompt {
                text: CONTINUE_PROMPT.to_string(),
            })
            .await;
            return Ok(());
        }

        if let Some(text) = &reply.text {
            if !text.trim().is_empty() {
                self.history.push(Turn::model(text.clone()));
                self.emit(AgentEvent::AssistantText { text: text.clone() }).await;
            }
        }

        for call in reply.function_calls {
            self.history.push(Turn::ModelFunctionCall { call: call.clone() });
            self.emit(AgentEvent::ToolCallStarted {
                call: ToolCallInfo::from(&call),
            })
            .await;

            // One increment per dispatch attempt, approval denials
            // included.
            self.tool_calls += 1;
            let registry = self.registry.as_ref().expect("registry built before stepping");
            let dispatcher = ToolDispatcher::new(registry, self.approval.as_deref());
            let outcome = dispatcher.dispatch(&call).await?;

            // A denied finish never terminates the run.
            let executed = matches!(outcome, DispatchOutcome::Executed(_));
            if executed && call.name == FINISH_TOOL_NAME {
                self.finished = true;
                self.final_result = call
                    .args
                    .get(FINISH_RESULT_ARG)
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
            }

            let result = outcome.into_text();

            self.history.push(Turn::response_to(&call, result.clone()));
            self.emit(AgentEvent::ToolCallCompleted {
                call: ToolCallInfo::from(&call),
                result,
            })
            .await;
        }

        Ok(())
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            debug!("Failed to emit agent event: {e}");
        }
    }
}
