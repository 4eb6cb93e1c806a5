//! Conversation history structures

use serde::{Deserialize, Serialize};

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Endpoint-assigned identifier for this call. Synthesized when the
    /// endpoint omits one so the matching response stays addressable.
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Arguments to pass to the tool
    pub args: serde_json::Value,
}

impl FunctionCall {
    /// Create a new function call with a generated id
    pub fn new<S: Into<String>>(name: S, args: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            args,
        }
    }
}

/// One unit of conversation history.
///
/// Ordering is append-only and significant: a `ModelFunctionCall` turn is
/// always followed (possibly after sibling call turns) by its matching
/// `FunctionResponse` before the next model invocation. The driver
/// maintains this by construction; the endpoint rejects histories that
/// violate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text supplied by the user (or synthesized by the driver)
    UserText { text: String },

    /// Text produced by the model
    ModelText { text: String },

    /// A function call requested by the model
    ModelFunctionCall { call: FunctionCall },

    /// The result of a dispatched function call, echoed back to the model
    FunctionResponse {
        /// Id of the call this responds to
        id: String,
        /// Name of the tool that was called
        name: String,
        /// Normalized text output of the tool
        output: String,
    },
}

impl Turn {
    /// Create a user text turn
    pub fn user<S: Into<String>>(text: S) -> Self {
        Turn::UserText { text: text.into() }
    }

    /// Create a model text turn
    pub fn model<S: Into<String>>(text: S) -> Self {
        Turn::ModelText { text: text.into() }
    }

    /// Create the response turn matching the given call
    pub fn response_to(call: &FunctionCall, output: String) -> Self {
        Turn::FunctionResponse {
            id: call.id.clone(),
            name: call.name.clone(),
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_pairs_with_call() {
        let call = FunctionCall::new("read_file", json!({"path": "a.txt"}));
        let response = Turn::response_to(&call, "contents".to_string());

        match response {
            Turn::FunctionResponse { id, name, output } => {
                assert_eq!(id, call.id);
                assert_eq!(name, "read_file");
                assert_eq!(output, "contents");
            }
            other => panic!("Expected FunctionResponse, got: {other:?}"),
        }
    }

    #[test]
    fn generated_call_ids_are_unique() {
        let a = FunctionCall::new("x", json!({}));
        let b = FunctionCall::new("x", json!({}));
        assert_ne!(a.id, b.id);
    }
}
