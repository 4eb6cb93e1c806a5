//! Tool registry: one name-addressed table over every tool source
//!
//! Built once per run, immutable afterwards. Providers are queried
//! concurrently, but precedence is fixed by their order at
//! construction: a later-registered name silently overwrites an
//! earlier one, and local callables register after all providers.

use crate::error::Result;
use crate::model::client::FunctionDeclaration;
use crate::model::schema::ParameterSchema;
use crate::tools::local::{FinishTool, LocalCallable};
use crate::tools::provider::ToolProvider;
use futures::future;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// What a registered name resolves to at dispatch time
#[derive(Clone)]
pub enum ToolBinding {
    /// A remote provider owns this tool
    Provider(Arc<dyn ToolProvider>),

    /// A local callable owns this tool
    Callable(Arc<dyn LocalCallable>),
}

/// The merged, name-addressed tool table for one run
pub struct ToolRegistry {
    declarations: Vec<FunctionDeclaration>,
    bindings: HashMap<String, ToolBinding>,
    // Position of each name in `declarations`, so overwrites keep
    // registration order deterministic.
    positions: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build the registry from the given providers and callables.
    ///
    /// All providers are queried concurrently; the built-in `finish`
    /// callable is always registered last.
    pub async fn build(
        providers: &[Arc<dyn ToolProvider>],
        callables: &[Arc<dyn LocalCallable>],
    ) -> Result<Self> {
        let mut registry = Self {
            declarations: Vec::new(),
            bindings: HashMap::new(),
            positions: HashMap::new(),
        };

        // Fan out list_tools; try_join_all preserves input order, which
        // fixes collision precedence regardless of completion order.
        let listings =
            future::try_join_all(providers.iter().map(|provider| provider.list_tools())).await?;

        for (provider, tools) in providers.iter().zip(listings) {
            debug!(provider = provider.name(), tools = tools.len(), "Registering provider tools");
            for tool in tools {
                let declaration = FunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description,
                    parameters: ParameterSchema::translate_root(&tool.input_schema)?,
                };
                registry.insert(declaration, ToolBinding::Provider(provider.clone()));
            }
        }

        for callable in callables {
            registry.insert_callable(callable.clone())?;
        }
        registry.insert_callable(Arc::new(FinishTool))?;

        Ok(registry)
    }

    fn insert_callable(&mut self, callable: Arc<dyn LocalCallable>) -> Result<()> {
        let declaration = FunctionDeclaration {
            name: callable.name().to_string(),
            description: callable.description().to_string(),
            parameters: ParameterSchema::translate_root(&callable.parameters_schema())?,
        };
        self.insert(declaration, ToolBinding::Callable(callable));
        Ok(())
    }

    fn insert(&mut self, declaration: FunctionDeclaration, binding: ToolBinding) {
        let name = declaration.name.clone();
        match self.positions.get(&name) {
            Some(&position) => {
                self.declarations[position] = declaration;
            }
            None => {
                self.positions.insert(name.clone(), self.declarations.len());
                self.declarations.push(declaration);
            }
        }
        self.bindings.insert(name, binding);
    }

    /// Full declaration list in registration order, for the turn executor
    pub fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    /// Resolve a name to its owning binding, for the dispatcher
    pub fn binding(&self, name: &str) -> Option<&ToolBinding> {
        self.bindings.get(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|d| d.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SchemaError, ToolError};
    use crate::model::schema::ParameterType;
    use crate::tools::local::FINISH_TOOL_NAME;
    use crate::tools::provider::{ProviderTool, ToolContent};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StaticProvider {
        name: String,
        tools: Vec<ProviderTool>,
    }

    impl StaticProvider {
        fn new(name: &str, tools: Vec<(&str, Value)>) -> Arc<dyn ToolProvider> {
            Arc::new(Self {
                name: name.to_string(),
                tools: tools
                    .into_iter()
                    .map(|(tool_name, schema)| ProviderTool {
                        name: tool_name.to_string(),
                        description: format!("{tool_name} from {name}"),
                        input_schema: schema,
                    })
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl ToolProvider for StaticProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn list_tools(&self) -> Result<Vec<ProviderTool>> {
            Ok(self.tools.clone())
        }

        async fn call_tool(&self, _name: &str, _args: &Value) -> Result<Vec<ToolContent>> {
            Ok(vec![ToolContent::Text(format!("result from {}", self.name))])
        }
    }

    struct UnavailableProvider;

    #[async_trait]
    impl ToolProvider for UnavailableProvider {
        fn name(&self) -> &str {
            "broken"
        }

        async fn list_tools(&self) -> Result<Vec<ProviderTool>> {
            Err(ToolError::ProviderUnavailable {
                name: "broken".to_string(),
                message: "connection lost".to_string(),
            }
            .into())
        }

        async fn call_tool(&self, _name: &str, _args: &Value) -> Result<Vec<ToolContent>> {
            unreachable!()
        }
    }

    fn string_arg_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        })
    }

    #[tokio::test]
    async fn exposes_every_distinct_tool_plus_finish() {
        let providers = vec![
            StaticProvider::new("fs", vec![
                ("list_files", json!({"type": "object", "properties": {}})),
                ("read_file", string_arg_schema()),
            ]),
            StaticProvider::new("web", vec![("fetch", string_arg_schema())]),
        ];

        let registry = ToolRegistry::build(&providers, &[]).await.unwrap();

        // 3 provider tools plus the built-in finish callable.
        assert_eq!(registry.len(), 4);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["list_files", "read_file", "fetch", FINISH_TOOL_NAME]);

        // Schemas came out in the endpoint dialect.
        let read_file = &registry.declarations()[1];
        assert_eq!(
            read_file.parameters.properties["path"].param_type,
            ParameterType::String
        );
    }

    #[tokio::test]
    async fn later_provider_wins_collisions() {
        let providers = vec![
            StaticProvider::new("a", vec![("x", string_arg_schema())]),
            StaticProvider::new("b", vec![("x", string_arg_schema())]),
        ];

        let registry = ToolRegistry::build(&providers, &[]).await.unwrap();

        // One declaration for "x", bound to provider B.
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.declarations()[0].description, "x from b");
        match registry.binding("x") {
            Some(ToolBinding::Provider(provider)) => assert_eq!(provider.name(), "b"),
            _ => panic!("Expected provider binding for x"),
        }
    }

    #[tokio::test]
    async fn finish_is_always_registered() {
        let registry = ToolRegistry::build(&[], &[]).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.binding(FINISH_TOOL_NAME),
            Some(ToolBinding::Callable(_))
        ));
    }

    #[tokio::test]
    async fn provider_failure_is_fatal() {
        let providers: Vec<Arc<dyn ToolProvider>> = vec![
            StaticProvider::new("ok", vec![("x", string_arg_schema())]),
            Arc::new(UnavailableProvider),
        ];

        let err = match ToolRegistry::build(&providers, &[]).await {
            Err(err) => err,
            Ok(_) => panic!("registry build should fail"),
        };
        assert!(matches!(
            err,
            Error::Tool(ToolError::ProviderUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_provider_schema_is_fatal() {
        let providers = vec![StaticProvider::new(
            "bad",
            vec![("x", json!({"type": "tuple"}))],
        )];

        let err = match ToolRegistry::build(&providers, &[]).await {
            Err(err) => err,
            Ok(_) => panic!("registry build should fail"),
        };
        assert!(matches!(
            err,
            Error::Schema(SchemaError::UnsupportedType { .. })
        ));
    }
}
