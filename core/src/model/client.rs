//! Model client trait and reply structures

use crate::model::schema::ParameterSchema;
use crate::model::turn::{FunctionCall, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trait for model endpoint clients
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Perform one model invocation over the full history with the given
    /// tool declarations. No retry here; resilience lives in the turn
    /// executor.
    async fn generate(
        &self,
        history: &[Turn],
        declarations: &[FunctionDeclaration],
    ) -> Result<ModelReply>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Parsed reply from one model invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    /// Text content, if the model produced any
    pub text: Option<String>,

    /// Function calls, in the order the model requested them
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    /// Whether the reply carries neither text nor function calls.
    /// The endpoint occasionally returns such replies; they are not a
    /// completion signal.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.function_calls.is_empty()
    }
}

/// A tool declaration as understood by the model endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function, unique across the merged registry
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// Typed parameter schema
    pub parameters: ParameterSchema,
}
