//! MCP (Model Context Protocol) tool provider
//!
//! Speaks line-delimited JSON-RPC 2.0 to a subprocess-backed MCP server
//! over stdio and exposes it through the `ToolProvider` seam.

use crate::error::{Result, ToolError};
use crate::tools::provider::{ProviderTool, ToolContent, ToolProvider};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// MCP server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Name for diagnostics
    pub name: String,
    /// Command and arguments to launch the server
    pub command: Vec<String>,
    /// Environment variables for the server process
    pub env: HashMap<String, String>,
    /// Timeout for individual requests in seconds
    pub timeout_seconds: u64,
}

impl McpServerConfig {
    /// Config for the given command line with default timeout
    pub fn new(name: String, command: Vec<String>) -> Self {
        Self {
            name,
            command,
            env: HashMap::new(),
            timeout_seconds: 30,
        }
    }
}

struct McpTransport {
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    request_id: u64,
}

/// A subprocess-backed MCP server exposed as a tool provider
pub struct McpProvider {
    config: McpServerConfig,
    transport: Mutex<McpTransport>,
}

impl McpProvider {
    /// Spawn the server process and perform the MCP initialize handshake
    pub async fn spawn(config: McpServerConfig) -> Result<Self> {
        if config.command.is_empty() {
            return Err(ToolError::ProviderUnavailable {
                name: config.name.clone(),
                message: "empty server command".to_string(),
            }
            .into());
        }

        let mut cmd = Command::new(&config.command[0]);
        cmd.args(&config.command[1..]);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| ToolError::ProviderUnavailable {
            name: config.name.clone(),
            message: format!("failed to spawn server: {e}"),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| ToolError::ProviderUnavailable {
            name: config.name.clone(),
            message: "no stdin for server process".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| ToolError::ProviderUnavailable {
            name: config.name.clone(),
            message: "no stdout for server process".to_string(),
        })?;

        let provider = Self {
            transport: Mutex::new(McpTransport {
                _child: child,
                stdin,
                stdout: BufReader::new(stdout),
                request_id: 0,
            }),
            config,
        };

        provider.initialize().await?;
        Ok(provider)
    }

    async fn initialize(&self) -> Result<()> {
        self.request(
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": { "tools": {} },
                "clientInfo": { "name": "relay", "version": env!("CARGO_PKG_VERSION") }
            }),
        )
        .await?;

        // The handshake ends with a notification (no id, no response).
        let mut transport = self.transport.lock().await;
        let notification = json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        });
        Self::write_message(&mut transport, &notification, &self.config.name).await
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let mut transport = self.transport.lock().await;
        transport.request_id += 1;
        let id = transport.request_id;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(provider = %self.config.name, method, id, "MCP request");
        Self::write_message(&mut transport, &request, &self.config.name).await?;

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            Self::read_response(&mut transport, id, &self.config.name),
        )
        .await??;

        if let Some(error) = response.get("error") {
            return Err(ToolError::ProviderUnavailable {
                name: self.config.name.clone(),
                message: format!("server error for {method}: {error}"),
            }
            .into());
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| {
                ToolError::ProviderUnavailable {
                    name: self.config.name.clone(),
                    message: format!("no result in response to {method}"),
                }
                .into()
            })
    }

    async fn write_message(
        transport: &mut McpTransport,
        message: &Value,
        provider: &str,
    ) -> Result<()> {
        let line = serde_json::to_string(message)?;
        let write = async {
            transport.stdin.write_all(line.as_bytes()).await?;
            transport.stdin.write_all(b"\n").await?;
            transport.stdin.flush().await
        };
        write.await.map_err(|e| {
            ToolError::ProviderUnavailable {
                name: provider.to_string(),
                message: format!("failed to write to server: {e}"),
            }
            .into()
        })
    }

    async fn read_response(
        transport: &mut McpTransport,
        id: u64,
        provider: &str,
    ) -> Result<Value> {
        loop {
            let mut line = String::new();
            let read = transport.stdout.read_line(&mut line).await.map_err(|e| {
                ToolError::ProviderUnavailable {
                    name: provider.to_string(),
                    message: format!("failed to read from server: {e}"),
                }
            })?;

            if read == 0 {
                return Err(ToolError::ProviderUnavailable {
                    name: provider.to_string(),
                    message: "server closed its stdout".to_string(),
                }
                .into());
            }

            if line.trim().is_empty() {
                continue;
            }

            let message: Value =
                serde_json::from_str(line.trim()).map_err(|e| ToolError::ProviderUnavailable {
                    name: provider.to_string(),
                    message: format!("invalid JSON from server: {e}"),
                })?;

            // Skip server-initiated notifications and unrelated responses.
            if message.get("id").and_then(|i| i.as_u64()) == Some(id) {
                return Ok(message);
            }
        }
    }
}

#[async_trait]
impl ToolProvider for McpProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn list_tools(&self) -> Result<Vec<ProviderTool>> {
        let result = self.request("tools/list", json!({})).await?;
        Ok(parse_tools_result(&result))
    }

    async fn call_tool(&self, name: &str, args: &Value) -> Result<Vec<ToolContent>> {
        let result = self
            .request(
                "tools/call",
                json!({ "name": name, "arguments": args }),
            )
            .await?;
        Ok(parse_call_result(&result))
    }
}

fn parse_tools_result(result: &Value) -> Vec<ProviderTool> {
    let tools = result
        .get("tools")
        .and_then(|t| t.as_array())
        .cloned()
        .unwrap_or_default();

    tools
        .iter()
        .filter_map(|tool| {
            let name = tool.get("name")?.as_str()?.to_string();
            Some(ProviderTool {
                name,
                description: tool
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default()
                    .to_string(),
                input_schema: tool
                    .get("inputSchema")
                    .cloned()
                    .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
            })
        })
        .collect()
}

fn parse_call_result(result: &Value) -> Vec<ToolContent> {
    let content = result
        .get("content")
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default();

    content
        .iter()
        .map(|block| {
            match (
                block.get("type").and_then(|t| t.as_str()),
                block.get("text").and_then(|t| t.as_str()),
            ) {
                (Some("text"), Some(text)) => ToolContent::Text(text.to_string()),
                _ => ToolContent::Other,
            }
        })
        .collect()
}
