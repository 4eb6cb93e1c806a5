//! Agent driver module

pub mod config;
pub mod core;
pub mod execution;

pub use config::{AgentBuilder, AgentConfig};
pub use core::AgentCore;
pub use execution::AgentExecution;
