use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_config::OutputConfig;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Subtitle path of a clip
    // @params: subtitle_dir, speaker_id, sequence index
    pub fn subtitle_path<P: AsRef<Path>>(subtitle_dir: P, speaker_id: &str, index: usize) -> PathBuf {
        subtitle_dir.as_ref().join(Self::subtitle_file_name(speaker_id, index))
    }

    pub fn subtitle_file_name(speaker_id: &str, index: usize) -> String {
        format!("{}-{}.srt", speaker_id, index)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Remove a directory with its content and create it again, empty
    pub fn reset_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_dir_all(path)
                .with_context(|| format!("Failed to remove directory: {:?}", path))?;
        }
        Self::ensure_dir(path)
    }

    /// Remove a file if present
    pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))?;
        Ok(true)
    }

    /// Clear the clip and subtitle directories, the narrative audio and the previous manifest before a run
    pub fn prepare_output(output: &OutputConfig) -> Result<()> {
        Self::reset_dir(&output.voice_dir)?;
        Self::reset_dir(&output.subtitle_dir)?;
        if Self::remove_file_if_exists(&output.audio_path)? {
            debug!("Removed previous narrative audio {:?}", output.audio_path);
        }
        if Self::remove_file_if_exists(&output.manifest_path)? {
            debug!("Removed previous manifest {:?}", output.manifest_path);
        }
        Ok(())
    }
}
