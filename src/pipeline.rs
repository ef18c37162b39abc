/*!
 * End-to-end run: script -> clips -> subtitle blocks -> narrative audio -> manifest.
 *
 * Clips are processed strictly in dialogue order because each clip's
 * measured duration decides where the next one starts. The manifest is
 * written last, so a failed run never leaves a manifest behind.
 */

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::app_config::OutputConfig;
use crate::dialogue::{is_speaker_token, DialogueAcquirer, DialogueEntry, DialogueSource};
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::manifest::{static_path, Manifest, SubtitleFileRef};
use crate::subtitle::{RepairJob, SubtitleBlock, SubtitleBlockBuilder, SubtitleRepairer, TimelineAccumulator};
use crate::synthesis::{concatenate_clips, AudioClip, SpeakerAudioSynthesizer};
use crate::transcription::ClipTranscriber;

/// What to produce
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    pub source: DialogueSource,
    pub speaker_a: String,
    pub speaker_b: String,
    pub music: String,
}

impl PipelineRequest {
    /// Reject malformed tokens and missing script files before any side effect
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [("speaker-a", &self.speaker_a), ("speaker-b", &self.speaker_b), ("music", &self.music)] {
            if !is_speaker_token(value) {
                return Err(PipelineError::Validation(format!(
                    "{} must only contain uppercase letters and single underscores, got {:?}",
                    name, value
                )));
            }
        }

        match &self.source {
            DialogueSource::Script(path) if !path.exists() => Err(PipelineError::Validation(format!(
                "Transcript file does not exist: {:?}",
                path
            ))),
            DialogueSource::Topic(topic) if topic.trim().is_empty() => {
                Err(PipelineError::Validation("Topic must not be empty".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    DialogueReady { lines: usize },
    ClipStarted { index: usize, total: usize },
    ClipFinished { index: usize, total: usize },
    RepairFinished { repaired: usize, total: usize },
    ManifestWritten(PathBuf),
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub entries: Vec<DialogueEntry>,
    pub clips: Vec<AudioClip>,
    pub blocks: Vec<SubtitleBlock>,
    pub subtitle_paths: Vec<PathBuf>,
    /// Start of each clip on the global timeline, in ms
    pub clip_offsets_ms: Vec<u64>,
    pub audio_path: PathBuf,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub repaired: usize,
}

/// The assembled stages of one run
pub struct Pipeline {
    acquirer: DialogueAcquirer,
    synthesizer: SpeakerAudioSynthesizer,
    transcriber: ClipTranscriber,
    builder: SubtitleBlockBuilder,
    repairer: Option<SubtitleRepairer>,
    output: OutputConfig,
    gap_seconds: f64,
    clean_output: bool,
}

impl Pipeline {
    pub fn new(
        acquirer: DialogueAcquirer,
        synthesizer: SpeakerAudioSynthesizer,
        transcriber: ClipTranscriber,
        output: OutputConfig,
        gap_seconds: f64,
    ) -> Self {
        Self {
            acquirer,
            synthesizer,
            transcriber,
            builder: SubtitleBlockBuilder::new(),
            repairer: None,
            output,
            gap_seconds,
            clean_output: true,
        }
    }

    pub fn with_repairer(mut self, repairer: SubtitleRepairer) -> Self {
        self.repairer = Some(repairer);
        self
    }

    /// Keep files of earlier runs in the output directories
    pub fn keep_existing_output(mut self) -> Self {
        self.clean_output = false;
        self
    }

    pub async fn run<F>(&self, request: &PipelineRequest, progress: F) -> Result<PipelineReport, PipelineError>
    where
        F: Fn(PipelineEvent),
    {
        request.validate()?;

        let entries = self.acquirer
            .acquire(&request.source, &request.speaker_a, &request.speaker_b)
            .await?;
        progress(PipelineEvent::DialogueReady { lines: entries.len() });

        // every speaker must resolve before anything is written
        let speakers: BTreeSet<&str> = entries.iter().map(|e| e.speaker_id.as_str()).collect();
        for speaker in speakers {
            self.synthesizer.references().resolve(speaker)?;
        }

        if self.clean_output {
            FileManager::prepare_output(&self.output).map_err(io_error)?;
        } else {
            FileManager::ensure_dir(&self.output.voice_dir).map_err(io_error)?;
            FileManager::ensure_dir(&self.output.subtitle_dir).map_err(io_error)?;
        }

        let total = entries.len();
        let mut timeline = TimelineAccumulator::new(self.gap_seconds);
        let mut clips = Vec::with_capacity(total);
        let mut blocks = Vec::with_capacity(total);
        let mut subtitle_paths = Vec::with_capacity(total);
        let mut clip_offsets_ms = Vec::with_capacity(total);

        for (index, entry) in entries.iter().enumerate() {
            progress(PipelineEvent::ClipStarted { index, total });

            let clip = self.synthesizer.synthesize(&entry.speaker_id, &entry.text, index).await?;
            let words = self.transcriber.transcribe_one(&clip.path, index, index).await?;

            let local = self.builder.build(&words);
            if local.is_empty() {
                warn!("Clip {} produced no words; its subtitle file will be empty", index);
            }

            let offset = timeline.current_offset_seconds();
            clip_offsets_ms.push(timeline.current_offset_ms());
            let placed = timeline.place(&local, clip.duration_seconds);
            placed.validate().map_err(|e| subtitle_error(index, e))?;

            let path = FileManager::subtitle_path(&self.output.subtitle_dir, &entry.speaker_id, index);
            placed.write_to_srt(&path).map_err(|e| subtitle_error(index, e))?;
            info!(
                "Clip {} ({}) at {:.3}s, {:.3}s long, {} cues -> {:?}",
                index, entry.speaker_id, offset, clip.duration_seconds, placed.len(), path
            );

            clips.push(clip);
            blocks.push(placed);
            subtitle_paths.push(path);
            progress(PipelineEvent::ClipFinished { index, total });
        }

        let placements: Vec<_> = clips
            .iter()
            .map(|c| c.path.as_path())
            .zip(clip_offsets_ms.iter().copied())
            .collect();
        let frames = concatenate_clips(&placements, &self.output.audio_path)
            .map_err(|e| PipelineError::Audio(format!("{:?}: {}", self.output.audio_path, e)))?;
        info!("Narrative audio written to {:?} ({} frames)", self.output.audio_path, frames);

        let repaired = match &self.repairer {
            Some(repairer) => {
                let repaired = self.repair(repairer, &entries, &mut blocks, &subtitle_paths).await?;
                progress(PipelineEvent::RepairFinished { repaired, total });
                repaired
            }
            None => 0,
        };

        let subtitle_files = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| SubtitleFileRef {
                speaker_id: entry.speaker_id.clone(),
                file_path: static_path(
                    &self.output.subtitle_dir,
                    &FileManager::subtitle_file_name(&entry.speaker_id, index),
                ),
            })
            .collect();

        let manifest = Manifest::new(
            subtitle_files,
            &request.music,
            self.output.video_mode.clone(),
            self.output.background_video.clone(),
            timeline.total_duration_seconds(),
        )?;
        let manifest_path = manifest.write_to(&self.output.manifest_path).map_err(io_error)?;
        info!("Manifest written to {:?}", manifest_path);
        progress(PipelineEvent::ManifestWritten(manifest_path.clone()));

        Ok(PipelineReport {
            entries,
            clips,
            blocks,
            subtitle_paths,
            clip_offsets_ms,
            audio_path: self.output.audio_path.clone(),
            manifest,
            manifest_path,
            repaired,
        })
    }

    /// Run the repair pass over all blocks and write back the ones that changed
    async fn repair(
        &self,
        repairer: &SubtitleRepairer,
        entries: &[DialogueEntry],
        blocks: &mut [SubtitleBlock],
        paths: &[PathBuf],
    ) -> Result<usize, PipelineError> {
        let jobs: Vec<RepairJob> = entries
            .iter()
            .zip(blocks.iter())
            .enumerate()
            .filter(|(_, (_, block))| !block.is_empty())
            .map(|(index, (entry, block))| RepairJob {
                index,
                canonical_text: entry.text.clone(),
                block: block.clone(),
            })
            .collect();

        let mut repaired = 0;
        for (index, outcome) in repairer.repair_all(&jobs).await {
            if !outcome.is_repaired() {
                continue;
            }
            let block = outcome.resolve(&blocks[index]);
            block.write_to_srt(&paths[index]).map_err(|e| subtitle_error(index, e))?;
            debug!("Rewrote repaired subtitles for clip {}", index);
            blocks[index] = block;
            repaired += 1;
        }

        info!("Repaired {}/{} subtitle blocks", repaired, jobs.len());
        Ok(repaired)
    }
}

fn subtitle_error(index: usize, error: anyhow::Error) -> PipelineError {
    PipelineError::Subtitle {
        index,
        message: format!("{:#}", error),
    }
}

fn io_error(error: anyhow::Error) -> PipelineError {
    PipelineError::Io(std::io::Error::other(format!("{:#}", error)))
}
