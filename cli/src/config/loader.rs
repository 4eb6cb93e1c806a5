//! Simple CLI configuration loader for relay
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./relay.json or ./.relay/config.json
//! 3. Git repository root: <repo_root>/.relay/config.json
//! 4. XDG config: ~/.config/relay/config.json
//! 5. Environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use relay_core::tools::mcp::McpServerConfig;
use relay_core::ResolvedModelConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variables consulted when no config file supplies a key
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: String,
    /// Model name
    pub model: Option<String>,
    /// Base URL (optional, uses the endpoint default if not specified)
    pub base_url: Option<String>,
    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// MCP servers to spawn at startup
    #[serde(default)]
    pub mcp_servers: Vec<McpServerEntry>,
}

/// One MCP server entry in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerEntry {
    /// Name for diagnostics
    pub name: String,
    /// Command and arguments to launch the server
    pub command: Vec<String>,
    /// Environment variables for the server process
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Per-request timeout override in seconds
    pub timeout_seconds: Option<u64>,
}

impl McpServerEntry {
    fn into_server_config(self) -> McpServerConfig {
        let mut config = McpServerConfig::new(self.name, self.command);
        config.env = self.env;
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        config
    }
}

/// Fully loaded CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Resolved model endpoint configuration
    pub model: ResolvedModelConfig,
    /// MCP servers to spawn
    pub mcp_servers: Vec<McpServerConfig>,
}

/// Loads configuration with CLI flag overrides applied on top
#[derive(Debug, Default)]
pub struct CliConfigLoader {
    config_override: Option<PathBuf>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
}

impl CliConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific config file or directory
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Override the API key
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Override the base URL
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Override the model name
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Load configuration from the highest-priority source available
    pub async fn load(&self) -> Result<CliConfig> {
        let raw = if let Some(path) = &self.config_override {
            Some(self.load_from_path(path).await?)
        } else {
            self.find_config().await?
        };

        match raw {
            Some(raw) => self.resolve_config(raw),
            None => self.resolve_from_env(),
        }
    }

    /// Walk the source priority list for a config file
    async fn find_config(&self) -> Result<Option<RawConfig>> {
        let mut candidates: Vec<PathBuf> = vec![
            PathBuf::from("relay.json"),
            PathBuf::from(".relay/config.json"),
        ];

        if let Some(git_root) = find_git_root()? {
            candidates.push(git_root.join(".relay/config.json"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("relay/config.json"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!("Loading config from {}", candidate.display());
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }

        Ok(None)
    }

    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let candidate = path.join("config.json");
            if candidate.is_file() {
                self.load_file(&candidate).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve raw config to a CliConfig, applying flag overrides
    fn resolve_config(&self, raw: RawConfig) -> Result<CliConfig> {
        let api_key = match &self.api_key_override {
            Some(key) => key.clone(),
            None => resolve_api_key(&raw.api_key)?,
        };

        let model_name = self
            .model_override
            .clone()
            .or(raw.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut model = ResolvedModelConfig::new(api_key, model_name);
        if let Some(base_url) = self.base_url_override.clone().or(raw.base_url) {
            model = model.with_base_url(base_url);
        }
        for (name, value) in raw.headers {
            model = model.with_header(name, value);
        }

        model
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        Ok(CliConfig {
            model,
            mcp_servers: raw
                .mcp_servers
                .into_iter()
                .map(McpServerEntry::into_server_config)
                .collect(),
        })
    }

    /// No file anywhere; fall back to environment variables
    fn resolve_from_env(&self) -> Result<CliConfig> {
        let api_key = match &self.api_key_override {
            Some(key) => key.clone(),
            None => API_KEY_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok())
                .ok_or_else(|| {
                    anyhow!(
                        "No config file found and none of {} are set",
                        API_KEY_VARS.join(", ")
                    )
                })?,
        };

        let model_name = self
            .model_override
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut model = ResolvedModelConfig::new(api_key, model_name);
        if let Some(base_url) = self.base_url_override.clone() {
            model = model.with_base_url(base_url);
        }

        model
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        Ok(CliConfig {
            model,
            mcp_servers: Vec::new(),
        })
    }
}

/// Handle the "env:VAR_NAME" indirection in config files
fn resolve_api_key(raw: &str) -> Result<String> {
    if let Some(var_name) = raw.strip_prefix("env:") {
        std::env::var(var_name)
            .with_context(|| format!("Environment variable not found: {var_name}"))
    } else {
        Ok(raw.to_string())
    }
}

/// Find git repository root by walking up from the working directory
fn find_git_root() -> Result<Option<PathBuf>> {
    let mut current = std::env::current_dir()?;

    loop {
        if current.join(".git").exists() {
            return Ok(Some(current));
        }

        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_explicit_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "sk-test",
                "model": "gemini-2.5-pro",
                "mcp_servers": [
                    {"name": "files", "command": ["uv", "run", "server.py"]}
                ]
            }"#,
        );

        let config = CliConfigLoader::new()
            .with_config_override(path)
            .load()
            .await
            .unwrap();

        assert_eq!(config.model.api_key, "sk-test");
        assert_eq!(config.model.model, "gemini-2.5-pro");
        assert_eq!(config.mcp_servers.len(), 1);
        assert_eq!(config.mcp_servers[0].name, "files");
        assert_eq!(config.mcp_servers[0].timeout_seconds, 30);
    }

    #[tokio::test]
    async fn directory_override_expects_config_json() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{"api_key": "sk-dir", "model": null, "base_url": null}"#);

        let config = CliConfigLoader::new()
            .with_config_override(dir.path().to_path_buf())
            .load()
            .await
            .unwrap();

        assert_eq!(config.model.api_key, "sk-dir");
        assert_eq!(config.model.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn flag_overrides_beat_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"api_key": "sk-file", "model": "gemini-2.0-flash", "base_url": null}"#,
        );

        let config = CliConfigLoader::new()
            .with_config_override(path)
            .with_api_key_override("sk-flag".to_string())
            .with_model_override("gemini-2.5-pro".to_string())
            .load()
            .await
            .unwrap();

        assert_eq!(config.model.api_key, "sk-flag");
        assert_eq!(config.model.model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn missing_config_path_is_an_error() {
        let err = CliConfigLoader::new()
            .with_config_override(PathBuf::from("/nonexistent/relay.json"))
            .load()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn env_indirection_resolves() {
        std::env::set_var("RELAY_TEST_KEY", "sk-from-env");
        assert_eq!(resolve_api_key("env:RELAY_TEST_KEY").unwrap(), "sk-from-env");
        assert_eq!(resolve_api_key("sk-literal").unwrap(), "sk-literal");
        assert!(resolve_api_key("env:RELAY_TEST_KEY_MISSING").is_err());
    }
}
