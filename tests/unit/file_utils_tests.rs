/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;
use dialogsync::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!test_file.is_dir());
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that subtitle paths follow the speaker-index convention
#[test]
fn test_subtitle_path_withSpeakerAndIndex_shouldBeDeterministic() {
    let path = FileManager::subtitle_path("public/srt", "JOE_ROGAN", 4);
    assert_eq!(path, Path::new("public/srt/JOE_ROGAN-4.srt"));
}

/// Test that write_to_file creates missing parent directories
#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a/b/c.txt");

    FileManager::write_to_file(&path, "content")?;
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    Ok(())
}

/// Test that prepare_output clears stale run output
#[test]
fn test_prepare_output_withStaleFiles_shouldResetDirectoriesAudioAndManifest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = common::output_config(temp_dir.path());

    common::write_wav(&output.voice_dir.join("OLD-0.wav"), 0.1)?;
    common::create_test_file(&output.subtitle_dir, "OLD-0.srt", "1\n")?;
    FileManager::write_to_file(&output.manifest_path, "{}")?;
    common::write_wav(&output.audio_path, 0.1)?;

    FileManager::prepare_output(&output)?;

    assert!(output.voice_dir.is_dir());
    assert!(output.subtitle_dir.is_dir());
    assert_eq!(std::fs::read_dir(&output.voice_dir)?.count(), 0);
    assert_eq!(std::fs::read_dir(&output.subtitle_dir)?.count(), 0);
    assert!(!output.manifest_path.exists());
    assert!(!output.audio_path.exists());
    Ok(())
}

/// Test that removing a missing file is not an error
#[test]
fn test_remove_file_if_exists_withMissingFile_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(!FileManager::remove_file_if_exists(temp_dir.path().join("nothing.json"))?);
    Ok(())
}
