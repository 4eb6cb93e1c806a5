//! # relay Core
//!
//! Core library for relay - a conversational tool-orchestration agent.
//!
//! This library drives a function-calling model endpoint against a merged
//! registry of tools drawn from external providers and local callables,
//! looping until the model signals completion through the finish tool.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentBuilder, AgentConfig, AgentCore, AgentExecution};
pub use config::ResolvedModelConfig;
pub use error::{Error, Result};

/// Current version of the relay-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
