use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::PipelineError;

use super::audio::wav_duration_seconds;
use super::engine::{clip_path, SynthesisEngine, SynthesisJob};
use super::speakers::SpeakerReferences;

// @struct: One synthesized line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioClip {
    // @field: Speaker of the line
    pub speaker_id: String,

    // @field: Position in the dialogue, 0-based
    pub sequence_index: usize,

    // @field: Written audio file
    pub path: PathBuf,

    // @field: Measured from the written file
    pub duration_seconds: f64,
}

/// Turns dialogue lines into measured audio clips
pub struct SpeakerAudioSynthesizer {
    engine: Arc<dyn SynthesisEngine>,
    references: SpeakerReferences,
    voice_dir: PathBuf,
    language: String,
}

impl SpeakerAudioSynthesizer {
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        references: SpeakerReferences,
        voice_dir: impl Into<PathBuf>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            references,
            voice_dir: voice_dir.into(),
            language: language.into(),
        }
    }

    pub fn references(&self) -> &SpeakerReferences {
        &self.references
    }

    /// Synthesize one line and measure the result
    pub async fn synthesize(
        &self,
        speaker_id: &str,
        text: &str,
        sequence_index: usize,
    ) -> Result<AudioClip, PipelineError> {
        let reference = self.references.resolve(speaker_id)?;
        let output = clip_path(&self.voice_dir, speaker_id, sequence_index);

        let failed = |status: String| PipelineError::SynthesisFailed {
            index: sequence_index,
            speaker: speaker_id.to_string(),
            status,
        };

        info!("Synthesizing clip {} for {}", sequence_index, speaker_id);
        let job = SynthesisJob {
            text: text.to_string(),
            reference,
            language: self.language.clone(),
            output: output.clone(),
        };
        self.engine.synthesize(&job).await.map_err(|e| failed(e.status))?;

        if !output.exists() {
            return Err(failed(format!("engine exited cleanly but wrote no file at {:?}", output)));
        }

        let duration_seconds = wav_duration_seconds(&output)
            .map_err(|e| failed(format!("unreadable audio at {:?}: {}", output, e)))?;
        debug!("Clip {} lasts {:.3}s", sequence_index, duration_seconds);

        Ok(AudioClip {
            speaker_id: speaker_id.to_string(),
            sequence_index,
            path: output,
            duration_seconds,
        })
    }
}
