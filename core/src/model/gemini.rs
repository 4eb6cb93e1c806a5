//! Gemini `generateContent` client implementation

use crate::config::ResolvedModelConfig;
use crate::error::{ModelError, Result};
use crate::model::client::{FunctionDeclaration, ModelClient, ModelReply};
use crate::model::turn::{FunctionCall, Turn};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gemini model client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    extra_headers: std::collections::HashMap<String, String>,
}

impl GeminiClient {
    /// Create a new Gemini client from a resolved model config
    pub fn new(config: &ResolvedModelConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ModelError::Authentication {
                message: "No API key found for Gemini".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            extra_headers: config.headers.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        history: &[Turn],
        declarations: &[FunctionDeclaration],
    ) -> Result<ModelReply> {
        let request = build_request(history, declarations);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!(model = %self.model, turns = history.len(), "Sending generateContent request");

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json");
        for (name, value) in &self.extra_headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Network {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::RateLimited {
                retry_after: parse_retry_delay(&body),
            }
            .into());
        }
        if status == 401 || status == 403 {
            return Err(ModelError::Authentication {
                message: "Invalid Gemini API key".to_string(),
            }
            .into());
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status,
                message: body,
            }
            .into());
        }

        let gemini_response: GenerateContentResponse =
            response.json().await.map_err(|e| ModelError::MalformedResponse {
                message: format!("Failed to parse response: {e}"),
            })?;

        Ok(convert_response(gemini_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Build the wire request from history and declarations.
///
/// Sampling temperature is fixed at 1.0, responses are text-only, and
/// function calling runs in AUTO mode; the endpoint never executes
/// tools itself.
fn build_request(
    history: &[Turn],
    declarations: &[FunctionDeclaration],
) -> GenerateContentRequest {
    let contents = history.iter().map(content_for_turn).collect();

    let tools = if declarations.is_empty() {
        None
    } else {
        Some(vec![ToolDeclarations {
            function_declarations: declarations.to_vec(),
        }])
    };

    GenerateContentRequest {
        contents,
        tools,
        tool_config: ToolConfig {
            function_calling_config: FunctionCallingConfig {
                mode: "AUTO".to_string(),
            },
        },
        generation_config: GenerationConfig {
            temperature: 1.0,
            response_modalities: vec!["TEXT".to_string()],
        },
    }
}

fn content_for_turn(turn: &Turn) -> Content {
    match turn {
        Turn::UserText { text } => Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: Some(text.clone()),
                ..Default::default()
            }],
        },
        Turn::ModelText { text } => Content {
            role: "model".to_string(),
            parts: vec![Part {
                text: Some(text.clone()),
                ..Default::default()
            }],
        },
        Turn::ModelFunctionCall { call } => Content {
            role: "model".to_string(),
            parts: vec![Part {
                function_call: Some(WireFunctionCall {
                    id: Some(call.id.clone()),
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Default::default()
            }],
        },
        Turn::FunctionResponse { id, name, output } => Content {
            role: "user".to_string(),
            parts: vec![Part {
                function_response: Some(WireFunctionResponse {
                    id: Some(id.clone()),
                    name: name.clone(),
                    response: serde_json::json!({ "output": output }),
                }),
                ..Default::default()
            }],
        },
    }
}

fn convert_response(response: GenerateContentResponse) -> ModelReply {
    let mut text_parts = Vec::new();
    let mut function_calls = Vec::new();

    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    for part in parts {
        if let Some(text) = part.text {
            if !text.is_empty() {
                text_parts.push(text);
            }
        }
        if let Some(call) = part.function_call {
            function_calls.push(FunctionCall {
                // The endpoint may omit call ids; synthesize one so the
                // matching response can carry it back.
                id: call.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                name: call.name,
                args: call.args,
            });
        }
    }

    ModelReply {
        text: if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n"))
        },
        function_calls,
    }
}

/// Parse the machine-readable retry delay from a 429 error body.
///
/// The endpoint reports it as a RetryInfo detail with a duration string
/// such as `"7s"` or `"0.5s"`.
fn parse_retry_delay(body: &str) -> Option<Duration> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let details = value.get("error")?.get("details")?.as_array()?;

    for detail in details {
        if let Some(delay) = detail.get("retryDelay").and_then(|d| d.as_str()) {
            let seconds: f64 = delay.strip_suffix('s')?.parse().ok()?;
            if seconds >= 0.0 {
                return Some(Duration::from_secs_f64(seconds));
            }
        }
    }

    None
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclarations>>,
    tool_config: ToolConfig,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionCallingConfig {
    mode: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_modalities: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
