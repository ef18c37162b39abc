/*!
 * Common test utilities for the dialogsync test suite
 */

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use dialogsync::app_config::OutputConfig;
use dialogsync::dialogue::{DialogueAcquirer, NoDelay, RetryPolicy};
use dialogsync::pipeline::Pipeline;
use dialogsync::providers::mock::MockGenerator;
use dialogsync::synthesis::{SpeakerAudioSynthesizer, SpeakerReferences, SpeakerRegistry};
use dialogsync::transcription::ClipTranscriber;

// Re-export the mock services module
pub mod mock_services;

use mock_services::{ScriptedEngine, ScriptedTranscriber};

/// Sample rate used for every WAV fixture
pub const FIXTURE_SAMPLE_RATE: u32 = 16_000;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes a silent mono WAV file lasting `seconds`
pub fn write_wav(path: &Path, seconds: f64) -> Result<()> {
    write_tone(path, seconds, 0)
}

/// Writes a mono WAV file lasting `seconds` where every sample equals `level`
pub fn write_tone(path: &Path, seconds: f64, level: i16) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let spec = WavSpec {
        channels: 1,
        sample_rate: FIXTURE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let frames = (seconds * FIXTURE_SAMPLE_RATE as f64).round() as u64;
    for _ in 0..frames {
        writer.write_sample(level)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes a JSON script file from `(speaker, text)` pairs
pub fn create_script(dir: &Path, filename: &str, lines: &[(&str, &str)]) -> Result<PathBuf> {
    let items: Vec<serde_json::Value> = lines
        .iter()
        .map(|(speaker, text)| serde_json::json!({ "agentId": speaker, "text": text }))
        .collect();
    create_test_file(dir, filename, &serde_json::to_string_pretty(&items)?)
}

/// Output layout rooted in a temporary directory
pub fn output_config(root: &Path) -> OutputConfig {
    OutputConfig {
        voice_dir: root.join("public/voice"),
        subtitle_dir: root.join("public/srt"),
        audio_path: root.join("public/audio.wav"),
        manifest_path: root.join("src/tmp/context.json"),
        ..OutputConfig::default()
    }
}

/// Registry with a reference sample on disk for each speaker
pub fn speaker_registry(root: &Path, speakers: &[&str]) -> Result<SpeakerRegistry> {
    let reference_dir = root.join("training_audio");
    let mut files = BTreeMap::new();
    for speaker in speakers {
        let file = format!("{}.wav", speaker.to_lowercase());
        write_wav(&reference_dir.join(&file), 0.5)?;
        files.insert(speaker.to_string(), file);
    }
    Ok(SpeakerRegistry::new(reference_dir, files))
}

/// Everything an end-to-end test needs, wired to in-memory services
pub struct PipelineFixture {
    pub root: TempDir,
    pub generator: Arc<MockGenerator>,
    pub delay: Arc<NoDelay>,
    pub engine: Arc<ScriptedEngine>,
    pub transcriber: Arc<ScriptedTranscriber>,
    pub output: OutputConfig,
}

impl PipelineFixture {
    pub fn new(
        generator: MockGenerator,
        engine: ScriptedEngine,
        transcriber: ScriptedTranscriber,
    ) -> Result<Self> {
        let root = create_temp_dir()?;
        let output = output_config(root.path());
        Ok(Self {
            root,
            generator: Arc::new(generator),
            delay: Arc::new(NoDelay::default()),
            engine: Arc::new(engine),
            transcriber: Arc::new(transcriber),
            output,
        })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Pipeline over the fixture's services with reference samples for `speakers`
    pub fn pipeline(&self, speakers: &[&str], gap_seconds: f64) -> Result<Pipeline> {
        let acquirer = DialogueAcquirer::new(self.generator.clone(), self.delay.clone(), RetryPolicy::default());
        let synthesizer = SpeakerAudioSynthesizer::new(
            self.engine.clone(),
            SpeakerReferences::new(speaker_registry(self.path(), speakers)?),
            self.output.voice_dir.clone(),
            "en",
        );
        let transcriber = ClipTranscriber::new(self.transcriber.clone());

        Ok(Pipeline::new(acquirer, synthesizer, transcriber, self.output.clone(), gap_seconds))
    }
}
