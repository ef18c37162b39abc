/*!
 * The context record handed to the video renderer.
 *
 * Built once after every clip has been processed and written as pretty JSON.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;
use crate::file_utils::FileManager;

/// Music token meaning "no soundtrack"
pub const NO_MUSIC: &str = "NONE";

/// Renderer path of a music track: `NONE` stays as is, anything else becomes `/music/<TOKEN>.MP3`
pub fn music_selector(music: &str) -> String {
    if music == NO_MUSIC {
        NO_MUSIC.to_string()
    } else {
        format!("/music/{}.MP3", music)
    }
}

/// Path of a subtitle file as the renderer sees it: `<subtitle dir name>/<file name>`
pub fn static_path(subtitle_dir: &Path, file_name: &str) -> String {
    match subtitle_dir.file_name() {
        Some(dir) => format!("{}/{}", dir.to_string_lossy(), file_name),
        None => file_name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleFileRef {
    pub speaker_id: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub initial_speaker_id: String,
    pub subtitle_files: Vec<SubtitleFileRef>,
    pub music_selector: String,
    pub video_mode: String,
    pub background_video: String,
    pub total_duration_seconds: f64,
}

impl Manifest {
    /// Build from the ordered subtitle files; the first one names the opening speaker
    pub fn new(
        subtitle_files: Vec<SubtitleFileRef>,
        music: &str,
        video_mode: impl Into<String>,
        background_video: impl Into<String>,
        total_duration_seconds: f64,
    ) -> Result<Self, PipelineError> {
        let initial_speaker_id = subtitle_files
            .first()
            .map(|f| f.speaker_id.clone())
            .ok_or_else(|| PipelineError::Validation("Cannot build a manifest without subtitle files".to_string()))?;

        Ok(Self {
            initial_speaker_id,
            subtitle_files,
            music_selector: music_selector(music),
            video_mode: video_mode.into(),
            background_video: background_video.into(),
            total_duration_seconds,
        })
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        FileManager::write_to_file(path, &json)?;
        Ok(path.to_path_buf())
    }

    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = FileManager::read_to_string(path)?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid manifest: {}", path.display()))
    }
}
