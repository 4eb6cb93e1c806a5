//! Tool dispatcher: resolves a requested call and normalizes its result

use crate::error::{Result, ToolError};
use crate::model::turn::FunctionCall;
use crate::tools::approval::ApprovalGate;
use crate::tools::provider::ToolContent;
use crate::tools::registry::{ToolBinding, ToolRegistry};
use tracing::debug;

/// Outcome of one dispatch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The tool executed; carries the normalized text result
    Executed(String),

    /// The approval gate declined; the tool was never invoked
    Denied,
}

impl DispatchOutcome {
    /// The text echoed back to the model. A denied call reads as an
    /// empty result.
    pub fn into_text(self) -> String {
        match self {
            DispatchOutcome::Executed(text) => text,
            DispatchOutcome::Denied => String::new(),
        }
    }
}

/// Dispatches one requested call against a built registry.
///
/// Resolution is a table lookup, never a scan: a name the registry
/// never exposed is a registry/model mismatch and fails the run.
pub struct ToolDispatcher<'a> {
    registry: &'a ToolRegistry,
    approval: Option<&'a dyn ApprovalGate>,
}

impl<'a> ToolDispatcher<'a> {
    /// Create a dispatcher for the given registry. Passing an approval
    /// gate enables per-call confirmation.
    pub fn new(registry: &'a ToolRegistry, approval: Option<&'a dyn ApprovalGate>) -> Self {
        Self { registry, approval }
    }

    /// Execute the call and return the outcome. Denial by the approval
    /// gate is an outcome, not an error; the caller must not treat a
    /// denied call as having run.
    pub async fn dispatch(&self, call: &FunctionCall) -> Result<DispatchOutcome> {
        let binding = self
            .registry
            .binding(&call.name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: call.name.clone(),
            })?;

        if let Some(gate) = self.approval {
            if !gate.confirm(&call.name, &call.args).await {
                debug!(tool = %call.name, "Tool call declined by approval gate");
                return Ok(DispatchOutcome::Denied);
            }
        }

        match binding {
            ToolBinding::Provider(provider) => {
                let blocks = provider.call_tool(&call.name, &call.args).await?;
                Ok(DispatchOutcome::Executed(join_text_blocks(&blocks)))
            }
            ToolBinding::Callable(callable) => {
                let output = callable.invoke(&call.args).await?;
                Ok(DispatchOutcome::Executed(output.into_text()))
            }
        }
    }
}

/// Concatenate the text blocks of a provider result with newline
/// separators; non-text blocks are ignored.
fn join_text_blocks(blocks: &[ToolContent]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ToolContent::Text(text) => Some(text.as_str()),
            ToolContent::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tools::local::{CallableOutput, LocalCallable};
    use crate::tools::provider::{ProviderTool, ToolProvider};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: AtomicUsize,
        blocks: Vec<ToolContent>,
    }

    impl CountingProvider {
        fn new(blocks: Vec<ToolContent>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                blocks,
            })
        }
    }

    #[async_trait]
    impl ToolProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn list_tools(&self) -> Result<Vec<ProviderTool>> {
            Ok(vec![ProviderTool {
                name: "list_files".to_string(),
                description: "Lists files".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }])
        }

        async fn call_tool(&self, _name: &str, _args: &Value) -> Result<Vec<ToolContent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.blocks.clone())
        }
    }

    struct StructuredCallable;

    #[async_trait]
    impl LocalCallable for StructuredCallable {
        fn name(&self) -> &str {
            "inspect"
        }

        fn description(&self) -> &str {
            "Returns structured data"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn invoke(&self, _args: &Value) -> Result<CallableOutput> {
            Ok(CallableOutput::Structured(json!({"status": "ok"})))
        }
    }

    struct DenyAll;

    #[async_trait]
    impl ApprovalGate for DenyAll {
        async fn confirm(&self, _name: &str, _args: &Value) -> bool {
            false
        }
    }

    async fn registry_with(
        provider: Arc<CountingProvider>,
    ) -> ToolRegistry {
        let providers: Vec<Arc<dyn ToolProvider>> = vec![provider];
        let callables: Vec<Arc<dyn LocalCallable>> = vec![Arc::new(StructuredCallable)];
        ToolRegistry::build(&providers, &callables).await.unwrap()
    }

    #[tokio::test]
    async fn joins_provider_text_blocks_with_newlines() {
        let provider = CountingProvider::new(vec![
            ToolContent::Text("a.txt".to_string()),
            ToolContent::Other,
            ToolContent::Text("b.txt".to_string()),
        ]);
        let registry = registry_with(provider.clone()).await;
        let dispatcher = ToolDispatcher::new(&registry, None);

        let outcome = dispatcher
            .dispatch(&FunctionCall::new("list_files", json!({})))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Executed("a.txt\nb.txt".to_string())
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn callable_results_are_normalized() {
        let registry = registry_with(CountingProvider::new(vec![])).await;
        let dispatcher = ToolDispatcher::new(&registry, None);

        let outcome = dispatcher
            .dispatch(&FunctionCall::new("inspect", json!({})))
            .await
            .unwrap();

        assert_eq!(outcome.into_text(), r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal() {
        let registry = registry_with(CountingProvider::new(vec![])).await;
        let dispatcher = ToolDispatcher::new(&registry, None);

        let err = dispatcher
            .dispatch(&FunctionCall::new("does_not_exist", json!({})))
            .await
            .unwrap_err();

        match err {
            Error::Tool(ToolError::UnknownTool { name }) => assert_eq!(name, "does_not_exist"),
            other => panic!("Expected UnknownTool, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn denied_call_short_circuits_without_executing() {
        let provider = CountingProvider::new(vec![ToolContent::Text("secret".to_string())]);
        let registry = registry_with(provider.clone()).await;
        let gate = DenyAll;
        let dispatcher = ToolDispatcher::new(&registry, Some(&gate));

        let outcome = dispatcher
            .dispatch(&FunctionCall::new("list_files", json!({})))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert_eq!(outcome.into_text(), "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
