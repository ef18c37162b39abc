use std::time::Duration;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use async_trait::async_trait;
use log::{error, warn};

use crate::errors::ProviderError;
use super::{ChatPrompt, Provider};

/// Messages API version sent with every request
const API_VERSION: &str = "2023-06-01";

/// Placeholder user turn; the API rejects system-only conversations
const EMPTY_USER_TURN: &str = "Go ahead.";

/// Client for the Anthropic messages API
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    /// Base URL without the `/v1/messages` route
    endpoint: String,
}

/// Messages API request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Messages API response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
    /// `max_tokens` means the reply was cut off
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// One content block; only `text` blocks carry output
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Map a prompt onto the messages API: the system text goes to `system`, the user turn is always present
    pub fn from_prompt(model: impl Into<String>, prompt: &ChatPrompt, temperature: f32, max_tokens: u32) -> Self {
        let user = prompt.user.clone().unwrap_or_else(|| EMPTY_USER_TURN.to_string());
        Self {
            model: model.into(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: user,
            }],
            system: Some(prompt.system.clone()),
            temperature: Some(temperature),
            max_tokens,
        }
    }
}

impl AnthropicResponse {
    pub fn was_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

impl Anthropic {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn messages_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.anthropic.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1/messages", base)
    }
}

#[async_trait]
impl Provider for Anthropic {
    type Request = AnthropicRequest;
    type Response = AnthropicResponse;

    async fn complete(&self, request: AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let response = self.client.post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic API error ({}): {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let parsed = response.json::<AnthropicResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Unexpected Anthropic response: {}", e)))?;
        if parsed.was_truncated() {
            warn!("Anthropic reply hit max_tokens ({}); it is probably incomplete", request.max_tokens);
        }
        Ok(parsed)
    }

    fn extract_text(response: &AnthropicResponse) -> String {
        response.content.iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect()
    }
}
