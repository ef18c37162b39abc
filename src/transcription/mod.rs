/*!
 * Word-level transcription of synthesized clips.
 *
 * The service is asked for one clip at a time, in dialogue order. Only the
 * text and clip-local start/end of each word survive; whatever segmentation
 * the service uses is flattened away.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{PipelineError, ProviderError};

pub mod whisper;

pub use whisper::WhisperClient;

/// One recognized word, relative to the start of its clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl WordTiming {
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
        }
    }
}

/// A word-timestamped speech recognizer
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Words of one clip, in spoken order
    async fn transcribe_clip(&self, clip: &Path) -> Result<Vec<WordTiming>, ProviderError>;
}

/// Transcribes clips in order, reporting which one failed
pub struct ClipTranscriber {
    service: Arc<dyn TranscriptionService>,
}

impl ClipTranscriber {
    pub fn new(service: Arc<dyn TranscriptionService>) -> Self {
        Self { service }
    }

    /// Words of a single clip; `completed` is how many earlier clips already succeeded
    pub async fn transcribe_one(
        &self,
        clip: &Path,
        index: usize,
        completed: usize,
    ) -> Result<Vec<WordTiming>, PipelineError> {
        debug!("Transcribing clip {}: {:?}", index, clip);

        match self.service.transcribe_clip(clip).await {
            Ok(words) => {
                debug!("Clip {} yielded {} words", index, words.len());
                Ok(words)
            }
            Err(e) => {
                error!("Transcription of clip {} failed: {}", index, e);
                Err(PipelineError::TranscriptionFailed {
                    index,
                    completed,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Word timings for every clip, in input order
    pub async fn transcribe(&self, clips: &[PathBuf]) -> Result<Vec<Vec<WordTiming>>, PipelineError> {
        info!("Transcribing {} clips", clips.len());
        let mut results = Vec::with_capacity(clips.len());

        for (index, clip) in clips.iter().enumerate() {
            let words = self.transcribe_one(clip, index, results.len()).await?;
            results.push(words);
        }

        Ok(results)
    }
}
