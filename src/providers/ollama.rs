use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error, warn};

use crate::errors::ProviderError;
use super::{ChatPrompt, Provider};

/// Client for a local Ollama server's chat route
#[derive(Debug)]
pub struct Ollama {
    /// Scheme and host, no trailing slash
    base_url: String,
    client: Client,
}

/// Sampling options; unset fields fall back to the model's defaults
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Non-streaming `/api/chat` request
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// `json` constrains the output to a JSON value
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,
    /// `length` when generation stopped at `num_predict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: false,
        }
    }

    /// System and user turns with the sampling options applied
    pub fn from_prompt(model: impl Into<String>, prompt: &ChatPrompt, temperature: f32, max_tokens: u32) -> Self {
        let mut messages = vec![ChatMessage::new("system", &prompt.system)];
        if let Some(user) = &prompt.user {
            messages.push(ChatMessage::new("user", user));
        }

        let request = Self::new(model, messages)
            .temperature(temperature)
            .num_predict(max_tokens);
        if prompt.json_output {
            request.format("json")
        } else {
            request
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl Ollama {
    /// Accepts `host:port` as well as a full URL
    pub fn from_url(url: impl Into<String>, timeout_secs: u64) -> Self {
        let mut base_url: String = url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            base_url = format!("http://{}", base_url);
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = ChatRequest;
    type Response = ChatResponse;

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("Ollama chat request to {} ({})", url, request.model);

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Ollama error ({}): {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Unexpected Ollama chat response: {}", e)))?;
        if parsed.done_reason.as_deref() == Some("length") {
            warn!("Ollama reply stopped at num_predict; it is probably incomplete");
        }
        Ok(parsed)
    }

    fn extract_text(response: &ChatResponse) -> String {
        response.message.content.clone()
    }
}
