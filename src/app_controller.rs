use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::sync::Arc;

use crate::app_config::Config;
use crate::dialogue::{DialogueAcquirer, DialogueSource, RetryPolicy, TokioDelay};
use crate::language_utils::{get_language_name, validate_language_code};
use crate::pipeline::{Pipeline, PipelineEvent, PipelineReport, PipelineRequest};
use crate::providers::{ConfiguredGenerator, TextGenerator};
use crate::subtitle::SubtitleRepairer;
use crate::synthesis::{CommandEngine, SpeakerAudioSynthesizer, SpeakerReferences, SpeakerRegistry};
use crate::transcription::{ClipTranscriber, WhisperClient};

// @module: Application controller for dialogue video generation

/// Wires configuration into a pipeline and reports progress on the terminal
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a run for this request talks to the generative service
    pub fn needs_generation(&self, request: &PipelineRequest) -> bool {
        matches!(request.source, DialogueSource::Topic(_)) || self.config.repair.enabled
    }

    /// Assemble the production pipeline from configuration
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let config = &self.config;
        let generator: Arc<dyn TextGenerator> = Arc::new(ConfiguredGenerator::from_config(&config.generation));

        let acquirer = DialogueAcquirer::new(
            generator.clone(),
            Arc::new(TokioDelay),
            RetryPolicy::from(&config.acquisition),
        )
        .with_max_exchanges(config.acquisition.max_exchanges);

        let language = validate_language_code(&config.synthesis.language)?;
        let engine = CommandEngine::python_script(&config.synthesis.command, &config.synthesis.script);
        let synthesizer = SpeakerAudioSynthesizer::new(
            Arc::new(engine),
            SpeakerReferences::new(SpeakerRegistry::from_config(&config.synthesis)),
            config.output.voice_dir.clone(),
            language,
        );

        let whisper = WhisperClient::new(&config.transcription.endpoint, config.transcription.timeout_secs)
            .context("Failed to create transcription client")?;
        let transcriber = ClipTranscriber::new(Arc::new(whisper));

        let mut pipeline = Pipeline::new(
            acquirer,
            synthesizer,
            transcriber,
            config.output.clone(),
            config.timeline.gap_secs,
        );

        if config.repair.enabled {
            pipeline = pipeline.with_repairer(SubtitleRepairer::new(generator, config.repair.concurrent_requests));
        }

        Ok(pipeline)
    }

    /// Validate the request, then build and run the configured pipeline
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineReport> {
        request.validate()?;
        if self.needs_generation(&request) {
            self.config.validate_generation()?;
        }

        info!(
            "🚀 dialogsync: {} - {}, voices in {}",
            self.config.generation.provider.display_name(),
            self.config.generation.get_model(),
            get_language_name(&self.config.synthesis.language)?
        );

        let pipeline = self.build_pipeline()?;
        Self::run_pipeline(&pipeline, &request).await
    }

    /// Run any pipeline with a terminal progress bar over its clips
    pub async fn run_pipeline(pipeline: &Pipeline, request: &PipelineRequest) -> Result<PipelineReport> {
        let start_time = std::time::Instant::now();
        let progress_bar = ProgressBar::hidden();
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clips ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let result = pipeline
            .run(request, |event| match event {
                PipelineEvent::DialogueReady { lines } => {
                    progress_bar.set_length(lines as u64);
                    progress_bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                PipelineEvent::ClipStarted { index, .. } => {
                    progress_bar.set_message(format!("clip {}", index));
                }
                PipelineEvent::ClipFinished { .. } => progress_bar.inc(1),
                PipelineEvent::RepairFinished { repaired, total } => {
                    progress_bar.set_message(format!("repaired {}/{}", repaired, total));
                }
                PipelineEvent::ManifestWritten(_) => progress_bar.finish_and_clear(),
            })
            .await;

        progress_bar.finish_and_clear();

        match result {
            Ok(report) => {
                info!(
                    "Success: {} clips, {:.1}s of dialogue in {:?}, manifest {:?} (took {:.1}s)",
                    report.clips.len(),
                    report.manifest.total_duration_seconds,
                    report.audio_path,
                    report.manifest_path,
                    start_time.elapsed().as_secs_f64()
                );
                Ok(report)
            }
            Err(e) => {
                match e.clip_index() {
                    Some(index) => error!("Run failed at {} stage, clip {}: {}", e.stage(), index, e),
                    None => error!("Run failed at {} stage: {}", e.stage(), e),
                }
                Err(e.into())
            }
        }
    }
}
