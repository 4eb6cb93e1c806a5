//! Model endpoint abstractions and the Gemini implementation

pub mod client;
pub mod executor;
pub mod gemini;
pub mod schema;
pub mod turn;

pub use client::{FunctionDeclaration, ModelClient, ModelReply};
pub use executor::TurnExecutor;
pub use gemini::GeminiClient;
pub use schema::{ParameterSchema, ParameterType, UNUSED_PROPERTY};
pub use turn::{FunctionCall, Turn};
