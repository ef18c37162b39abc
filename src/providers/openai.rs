use std::time::Duration;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use async_trait::async_trait;
use log::{error, warn};

use crate::errors::ProviderError;
use super::{ChatPrompt, Provider};

/// Client for OpenAI-compatible chat completion APIs (OpenAI, OpenRouter, LM Studio)
#[derive(Debug)]
pub struct OpenAI {
    client: Client,
    api_key: String,
    /// Base URL, e.g. `https://openrouter.ai/api/v1`
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    /// Set for prompts that expect a JSON object back
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    /// Null for some refusals
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    /// `length` means the reply was cut off
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens,
            response_format: None,
            stream: false,
        }
    }

    /// System turn, optional user turn, JSON mode when the prompt asks for it
    pub fn from_prompt(model: impl Into<String>, prompt: &ChatPrompt, temperature: f32, max_tokens: u32) -> Self {
        let mut request = Self::new(model, max_tokens)
            .add_message("system", &prompt.system)
            .temperature(temperature);
        if let Some(user) = &prompt.user {
            request = request.add_message("user", user);
        }
        if prompt.json_output {
            request = request.json_object();
        }
        request
    }

    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat { format_type: "json_object".to_string() });
        self
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl OpenAIResponse {
    pub fn was_truncated(&self) -> bool {
        self.choices.first().and_then(|c| c.finish_reason.as_deref()) == Some("length")
    }
}

impl OpenAI {
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

    fn completions_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let response = self.client.post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion error ({}) from {}: {}", status, self.endpoint, body);
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let parsed = response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Unexpected chat completion response: {}", e)))?;
        if parsed.choices.is_empty() {
            return Err(ProviderError::ParseError("Chat completion response has no choices".to_string()));
        }
        if parsed.was_truncated() {
            warn!("Completion hit max_tokens ({}); it is probably incomplete", request.max_tokens);
        }
        Ok(parsed)
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response.choices.first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}
