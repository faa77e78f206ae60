//! Text-generation gateway — chat completions with forced tool calls
//!
//! Provides a `TextGenerator` trait implemented by `GatewayClient`, a client
//! for an OpenAI-compatible chat-completions endpoint. Every request binds a
//! single tool with `tool_choice` so the response is machine-parseable JSON
//! arguments rather than free text. Callers never scrape natural-language
//! model output.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::GatewayConfig;

/// Environment variable holding the gateway API key.
pub const API_KEY_ENV: &str = "AI_GATEWAY_KEY";

// ============================================================================
// TextGenerator trait
// ============================================================================

/// Abstraction over the chat-completion gateway.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Issue one completion request that forces the named tool and return the
    /// parsed arguments of its invocation.
    async fn call_tool(
        &self,
        messages: Vec<ChatMessage>,
        tool: ToolFunction,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Model identifier for logging.
    fn model(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

/// Gateway call errors. Rate-limit and quota exhaustion are separate
/// variants because the search path surfaces them to callers with distinct
/// status codes; everything else collapses into `Api`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("AI credits exhausted")]
    QuotaExhausted,

    #[error("Gateway error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Response contained no tool invocation")]
    MissingToolCall,

    #[error("Unparseable tool arguments: {0}")]
    ToolArguments(#[from] serde_json::Error),
}

// ============================================================================
// Wire types
// ============================================================================

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Declaration of a callable tool with a JSON-schema parameter description.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction {
    name: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCallInvocation>,
}

#[derive(Debug, Deserialize)]
struct ToolCallInvocation {
    function: ToolCallFunction,
}

/// The invocation's arguments arrive as a JSON string that still requires
/// explicit parsing; a malformed string is an upstream contract violation.
#[derive(Debug, Deserialize)]
struct ToolCallFunction {
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    error: Option<GatewayErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

// ============================================================================
// GatewayClient
// ============================================================================

/// Chat-completion client for the configured gateway endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig, api_key: String) -> Result<Self, GatewayError> {
        if api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Build a client reading the API key from the environment. Returns
    /// `None` when no key is configured so callers can skip AI steps.
    pub fn from_env(config: &GatewayConfig) -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::new(config, api_key).ok()
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        config: &GatewayConfig,
        api_key: String,
        base_url: String,
    ) -> Result<Self, GatewayError> {
        let mut client = Self::new(config, api_key)?;
        client.base_url = base_url;
        Ok(client)
    }

    async fn complete_once(
        &self,
        messages: Vec<ChatMessage>,
        tool: ToolFunction,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let tool_name = tool.name.clone();

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            tools: vec![ToolSpec {
                kind: "function",
                function: tool,
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: ToolChoiceFunction { name: tool_name },
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(GatewayError::RateLimited);
            }
            if status.as_u16() == 402 {
                return Err(GatewayError::QuotaExhausted);
            }

            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GatewayErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "AI gateway error");

            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let invocation = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.tool_calls.into_iter().next())
            .ok_or(GatewayError::MissingToolCall)?;

        let arguments: serde_json::Value = serde_json::from_str(&invocation.function.arguments)?;
        Ok(arguments)
    }
}

#[async_trait]
impl TextGenerator for GatewayClient {
    async fn call_tool(
        &self,
        messages: Vec<ChatMessage>,
        tool: ToolFunction,
    ) -> Result<serde_json::Value, GatewayError> {
        self.complete_once(messages, tool).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// TESTS
// ============================================================================
