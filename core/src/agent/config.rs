//! Agent configuration and builder

use crate::agent::AgentCore;
use crate::error::Result;
use crate::model::client::ModelClient;
use crate::output::{AgentOutput, NullOutput};
use crate::tools::approval::ApprovalGate;
use crate::tools::local::LocalCallable;
use crate::tools::provider::ToolProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for an agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Safety valve: maximum steps per run. Termination is normally
    /// reached only through the finish signal; hitting this ceiling
    /// yields a failure outcome.
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_steps: 50 }
    }
}

/// Builder for assembling an agent
pub struct AgentBuilder {
    client: Arc<dyn ModelClient>,
    config: AgentConfig,
    providers: Vec<Arc<dyn ToolProvider>>,
    callables: Vec<Arc<dyn LocalCallable>>,
    approval: Option<Box<dyn ApprovalGate>>,
    output: Box<dyn AgentOutput>,
}

impl AgentBuilder {
    /// Create a new builder over the given model client
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            config: AgentConfig::default(),
            providers: Vec::new(),
            callables: Vec::new(),
            approval: None,
            output: Box::new(NullOutput),
        }
    }

    /// Set agent configuration
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum steps
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    /// Add a tool provider. Registration order is fixed here and
    /// determines collision precedence.
    pub fn with_provider(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Add a local callable
    pub fn with_callable(mut self, callable: Arc<dyn LocalCallable>) -> Self {
        self.callables.push(callable);
        self
    }

    /// Install an approval gate; its presence enables per-call
    /// confirmation
    pub fn with_approval(mut self, approval: Box<dyn ApprovalGate>) -> Self {
        self.approval = Some(approval);
        self
    }

    /// Set the output handler
    pub fn with_output(mut self, output: Box<dyn AgentOutput>) -> Self {
        self.output = output;
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<AgentCore> {
        Ok(AgentCore::new(
            self.config,
            self.client,
            self.providers,
            self.callables,
            self.approval,
            self.output,
        ))
    }
}
