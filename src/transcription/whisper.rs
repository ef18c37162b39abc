use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;

use super::{TranscriptionService, WordTiming};

/// Request body of the transcription server
#[derive(Debug, Serialize)]
pub struct TranscribeRequest {
    pub audios: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WhisperWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Deserialize)]
pub struct WhisperSegment {
    #[serde(default)]
    pub words: Vec<WhisperWord>,
}

/// Per-file result: either a transcription or an error message
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WhisperResult {
    Failed { error: String },
    Transcribed { segments: Vec<WhisperSegment> },
}

/// One `[result, path]` pair of the response array
#[derive(Debug, Deserialize)]
pub struct WhisperEntry(pub WhisperResult, pub String);

impl WhisperResult {
    /// Flatten segments into words
    pub fn into_words(self) -> Result<Vec<WordTiming>, ProviderError> {
        match self {
            Self::Failed { error } => Err(ProviderError::RequestFailed(error)),
            Self::Transcribed { segments } => Ok(segments
                .into_iter()
                .flat_map(|s| s.words)
                .map(|w| WordTiming::new(w.text, w.start, w.end))
                .collect()),
        }
    }
}

/// HTTP client for a whisper-timestamped transcription server
#[derive(Debug)]
pub struct WhisperClient {
    endpoint: Url,
    client: Client,
}

impl WhisperClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)
        } else {
            Url::parse(&format!("http://{}", endpoint))
        }
        .map_err(|e| ProviderError::ConnectionError(format!("Invalid transcription endpoint {}: {}", endpoint, e)))?;

        Ok(Self {
            endpoint,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a batch of paths and return the raw per-file entries
    pub async fn request(&self, audios: Vec<String>) -> Result<Vec<WhisperEntry>, ProviderError> {
        let response = self.client.post(self.endpoint.clone())
            .json(&TranscribeRequest { audios })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Transcription server error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await?;
        parse_response(&response_text)
    }
}

/// Parse the server's `[[result, path], ...]` body
pub fn parse_response(body: &str) -> Result<Vec<WhisperEntry>, ProviderError> {
    serde_json::from_str::<Vec<WhisperEntry>>(body)
        .map_err(|e| ProviderError::ParseError(format!("Failed to parse transcription response: {}", e)))
}

#[async_trait]
impl TranscriptionService for WhisperClient {
    async fn transcribe_clip(&self, clip: &Path) -> Result<Vec<WordTiming>, ProviderError> {
        let path = clip.to_string_lossy().to_string();
        let mut entries = self.request(vec![path.clone()]).await?;

        if entries.len() != 1 {
            return Err(ProviderError::ParseError(format!(
                "Expected one transcription result for {}, got {}",
                path,
                entries.len()
            )));
        }

        let WhisperEntry(result, served_path) = entries.remove(0);
        debug!("Transcription server answered for {}", served_path);
        result.into_words()
    }
}
