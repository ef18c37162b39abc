/*!
 * Dialogue acquisition.
 *
 * A script either comes from a JSON file or from the generative service.
 * Generation runs under a bounded retry loop with a fixed, injectable delay
 * between attempts; every attempt re-queries from scratch.
 */

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::AcquisitionConfig;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::providers::TextGenerator;

use super::extract::locate_payload;
use super::prompts::dialogue_prompt;
use super::{parse_dialogue, DialogueEntry};

/// Where the script comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueSource {
    /// Pre-written JSON script
    Script(PathBuf),
    /// Topic handed to the generative service
    Topic(String),
}

/// Waits between acquisition attempts
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Real delay on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay that returns immediately and counts how often it was asked to wait
#[derive(Debug, Default)]
pub struct NoDelay {
    waits: std::sync::atomic::AtomicUsize,
}

impl NoDelay {
    pub fn wait_count(&self) -> usize {
        self.waits.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {
        self.waits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

/// Attempt budget and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(15),
        }
    }
}

impl From<&AcquisitionConfig> for RetryPolicy {
    fn from(config: &AcquisitionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// State of the retry loop
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    last_error: Option<String>,
}

/// Produces the validated, ordered script for a run
pub struct DialogueAcquirer {
    generator: Arc<dyn TextGenerator>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
    max_exchanges: u32,
}

impl DialogueAcquirer {
    pub fn new(generator: Arc<dyn TextGenerator>, delay: Arc<dyn Delay>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            delay,
            policy,
            max_exchanges: 7,
        }
    }

    pub fn with_max_exchanges(mut self, max_exchanges: u32) -> Self {
        self.max_exchanges = max_exchanges;
        self
    }

    /// Obtain the script from a file or from the generative service
    pub async fn acquire(
        &self,
        source: &DialogueSource,
        speaker_a: &str,
        speaker_b: &str,
    ) -> Result<Vec<DialogueEntry>, PipelineError> {
        match source {
            DialogueSource::Script(path) => {
                let entries = load_script(path)?;
                info!("Transcript read from {:?} ({} entries)", path, entries.len());
                Ok(entries)
            }
            DialogueSource::Topic(topic) => self.generate(topic, speaker_a, speaker_b).await,
        }
    }

    /// Query the generative service until a valid script comes back or the budget is spent
    pub async fn generate(
        &self,
        topic: &str,
        speaker_a: &str,
        speaker_b: &str,
    ) -> Result<Vec<DialogueEntry>, PipelineError> {
        let mut state = RetryState::default();

        while state.attempt < self.policy.max_attempts {
            state.attempt += 1;
            info!("Generating transcript, attempt {}/{}", state.attempt, self.policy.max_attempts);

            match self.attempt(topic, speaker_a, speaker_b).await {
                Ok(entries) => {
                    info!("Valid transcript generated ({} lines)", entries.len());
                    for (i, entry) in entries.iter().enumerate() {
                        debug!("{}. {}: {:?}", i + 1, entry.speaker_id, entry.text);
                    }
                    return Ok(entries);
                }
                Err(reason) => {
                    warn!("Attempt {} failed: {}", state.attempt, reason);
                    state.last_error = Some(reason);

                    if state.attempt < self.policy.max_attempts {
                        debug!("Waiting {:?} before next attempt", self.policy.delay);
                        self.delay.wait(self.policy.delay).await;
                    }
                }
            }
        }

        error!("All {} transcript attempts failed for topic: {}", state.attempt, topic);
        Err(PipelineError::AcquisitionFailed {
            topic: topic.to_string(),
            attempts: state.attempt,
            last_error: state.last_error.unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }

    /// One attempt; every failure mode is reported as a message
    async fn attempt(&self, topic: &str, speaker_a: &str, speaker_b: &str) -> Result<Vec<DialogueEntry>, String> {
        let prompt = dialogue_prompt(topic, speaker_a, speaker_b, self.max_exchanges);

        let content = self.generator.generate(&prompt).await
            .map_err(|e| format!("service error: {}", e))?;
        debug!("Received {} characters from the generative service", content.len());

        let (strategy, payload) = locate_payload(&content)
            .ok_or_else(|| "could not locate a JSON payload in the response".to_string())?;
        debug!("Payload located with {:?}", strategy);

        let parsed: Value = serde_json::from_str(&payload)
            .map_err(|e| format!("malformed payload: {}", e))?;

        let transcript = parsed.get("transcript")
            .ok_or_else(|| "payload has no transcript field".to_string())?;
        if !transcript.is_array() {
            return Err("transcript field is not an array".to_string());
        }

        let entries = parse_dialogue(transcript).map_err(|e| e.to_string())?;

        if let Some(stranger) = entries.iter().find(|e| e.speaker_id != speaker_a && e.speaker_id != speaker_b) {
            return Err(format!("unexpected speaker {} in generated transcript", stranger.speaker_id));
        }

        Ok(entries)
    }
}

/// Read and validate a JSON script file; any malformed entry rejects the file
pub fn load_script(path: &Path) -> Result<Vec<DialogueEntry>, PipelineError> {
    let raw = FileManager::read_to_string(path).map_err(|e| {
        PipelineError::Validation(format!("Could not read transcript file: {:#}", e))
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|e| {
        PipelineError::Validation(format!("Invalid JSON in {:?}: {}", path, e))
    })?;

    parse_dialogue(&value)
}
