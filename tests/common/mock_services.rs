/*!
 * In-memory synthesis and transcription services for testing
 *
 * The engine writes real WAV files of a scripted length so that clip
 * durations are measured exactly as in production.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dialogsync::errors::ProviderError;
use dialogsync::synthesis::{EngineFailure, SynthesisEngine, SynthesisJob};
use dialogsync::transcription::{TranscriptionService, WordTiming};

use super::write_wav;

/// Engine that writes a silent clip whose length is looked up by line text
#[derive(Default)]
pub struct ScriptedEngine {
    durations: HashMap<String, f64>,
    default_duration: f64,
    fail_on: Option<String>,
    jobs: Mutex<Vec<SynthesisJob>>,
}

impl ScriptedEngine {
    pub fn new(default_duration: f64) -> Self {
        Self {
            default_duration,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, text: &str, seconds: f64) -> Self {
        self.durations.insert(text.to_string(), seconds);
        self
    }

    /// Exit with a non-zero status for this line
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    pub fn jobs(&self) -> Vec<SynthesisJob> {
        self.jobs.lock().clone()
    }
}

#[async_trait]
impl SynthesisEngine for ScriptedEngine {
    async fn synthesize(&self, job: &SynthesisJob) -> Result<(), EngineFailure> {
        self.jobs.lock().push(job.clone());

        if self.fail_on.as_deref() == Some(job.text.as_str()) {
            return Err(EngineFailure { status: "XTTS exited with code 1".to_string() });
        }

        let seconds = self.durations.get(&job.text).copied().unwrap_or(self.default_duration);
        write_wav(&job.output, seconds).map_err(|e| EngineFailure { status: e.to_string() })
    }
}

/// Transcriber that answers from a table keyed by clip file name
#[derive(Default)]
pub struct ScriptedTranscriber {
    words: HashMap<String, Vec<WordTiming>>,
    fail_on: Option<String>,
    requests: Mutex<Vec<PathBuf>>,
}

impl ScriptedTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(mut self, clip_name: &str, words: Vec<WordTiming>) -> Self {
        self.words.insert(clip_name.to_string(), words);
        self
    }

    pub fn failing_on(mut self, clip_name: &str) -> Self {
        self.fail_on = Some(clip_name.to_string());
        self
    }

    pub fn requests(&self) -> Vec<PathBuf> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TranscriptionService for ScriptedTranscriber {
    async fn transcribe_clip(&self, clip: &Path) -> Result<Vec<WordTiming>, ProviderError> {
        self.requests.lock().push(clip.to_path_buf());

        let name = clip
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("could not transcribe {}", name),
            });
        }

        Ok(self.words.get(&name).cloned().unwrap_or_default())
    }
}
