/*!
 * Provider implementations for the generative text service.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: any OpenAI-compatible chat completions API (OpenRouter, LM Studio)
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 *
 * The pipeline only talks to them through the [`TextGenerator`] trait.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{GenerationConfig, GenerationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

use anthropic::{Anthropic, AnthropicRequest};
use ollama::{ChatRequest, Ollama};
use openai::{OpenAI, OpenAIRequest};

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind [`GenerationClient`].
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// A system + user prompt pair sent to a generative service
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    /// Instructions for the model
    pub system: String,
    /// The user turn, if any
    pub user: Option<String>,
    /// Ask the service for a JSON object response when it supports it
    pub json_output: bool,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: None,
            json_output: false,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Anything that turns a prompt into free-form text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one completion and return the raw response text
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, ProviderError>;
}

/// Generative text client selected from configuration
#[derive(Debug)]
pub enum GenerationClient {
    OpenAI { client: OpenAI, model: String },
    Ollama { client: Ollama, model: String },
    Anthropic { client: Anthropic, model: String },
}

/// Generation parameters shared by every backend
#[derive(Debug, Clone, Copy)]
struct SamplingOptions {
    temperature: f32,
    max_tokens: u32,
}

/// Client together with its sampling options
#[derive(Debug)]
pub struct ConfiguredGenerator {
    client: GenerationClient,
    sampling: SamplingOptions,
}

impl ConfiguredGenerator {
    /// Build the client for the active provider in `config`
    pub fn from_config(config: &GenerationConfig) -> Self {
        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();

        let client = match config.provider {
            GenerationProvider::OpenAI => GenerationClient::OpenAI {
                client: OpenAI::new(config.get_api_key(), endpoint, timeout_secs),
                model,
            },
            GenerationProvider::Ollama => GenerationClient::Ollama {
                client: Ollama::from_url(endpoint, timeout_secs),
                model,
            },
            GenerationProvider::Anthropic => GenerationClient::Anthropic {
                client: Anthropic::new(config.get_api_key(), endpoint, timeout_secs),
                model,
            },
        };

        Self {
            client,
            sampling: SamplingOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for ConfiguredGenerator {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        let SamplingOptions { temperature, max_tokens } = self.sampling;

        match &self.client {
            GenerationClient::OpenAI { client, model } => {
                let request = OpenAIRequest::from_prompt(model, prompt, temperature, max_tokens);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            GenerationClient::Ollama { client, model } => {
                let request = ChatRequest::from_prompt(model, prompt, temperature, max_tokens);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            GenerationClient::Anthropic { client, model } => {
                let request = AnthropicRequest::from_prompt(model, prompt, temperature, max_tokens);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
        }
    }
}
