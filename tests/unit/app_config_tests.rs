/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use dialogsync::app_config::{Config, GenerationProvider, LogLevel};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.generation.provider, GenerationProvider::OpenAI);
    assert_eq!(config.acquisition.max_attempts, 5);
    assert_eq!(config.acquisition.retry_delay_secs, 15);
    assert_eq!(config.timeline.gap_secs, 0.2);
    assert_eq!(config.synthesis.command, "python3");
    assert_eq!(config.synthesis.script, "xtts_generate.py");
    assert_eq!(config.synthesis.language, "en");
    assert_eq!(config.transcription.endpoint, "http://localhost:5000/transcribe");
    assert!(!config.repair.enabled);
    assert_eq!(config.output.video_mode, "normal");
    assert_eq!(config.output.audio_path, std::path::Path::new("public/audio.wav"));
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that the predefined speakers are registered
#[test]
fn test_default_config_withPredefinedSpeakers_shouldMapReferenceFiles() {
    let config = Config::default();
    let speakers = &config.synthesis.speakers;

    assert_eq!(speakers.get("JOE_ROGAN").map(String::as_str), Some("jreaudio.mp3"));
    assert_eq!(speakers.get("BARACK_OBAMA").map(String::as_str), Some("obama.mp3"));
    assert_eq!(speakers.len(), 7);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.synthesis.language = "english".to_string();
    assert!(config.validate().is_err());
    config.synthesis.language = "en".to_string();

    config.timeline.gap_secs = -0.1;
    assert!(config.validate().is_err());
    config.timeline.gap_secs = 0.2;

    config.acquisition.max_attempts = 0;
    assert!(config.validate().is_err());
    config.acquisition.max_attempts = 5;

    config.synthesis.speakers.insert("not_upper".to_string(), "x.mp3".to_string());
    assert!(config.validate().is_err());
}

/// Test that the API key is only demanded by the generation check
#[test]
fn test_validate_generation_withMissingApiKey_shouldFailForHostedProviders() {
    let mut config = Config::default();
    config.generation.provider = GenerationProvider::OpenAI;
    for provider in config.generation.available_providers.iter_mut() {
        provider.api_key.clear();
    }

    assert!(config.validate().is_ok());
    assert!(config.validate_generation().is_err());

    config.generation.provider = GenerationProvider::Ollama;
    assert!(config.validate_generation().is_ok());
}

/// Test the provider name parsing
#[test]
fn test_generation_provider_fromStr_shouldParseKnownNames() {
    assert_eq!("ollama".parse::<GenerationProvider>().unwrap(), GenerationProvider::Ollama);
    assert_eq!("Anthropic".parse::<GenerationProvider>().unwrap(), GenerationProvider::Anthropic);
    assert!("nope".parse::<GenerationProvider>().is_err());
}

/// Test partial config files fall back to defaults
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"timeline": {"gap_secs": 0.5}, "log_level": "debug"}"#)?;
    assert_eq!(config.timeline.gap_secs, 0.5);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.acquisition.max_attempts, 5);
    Ok(())
}

/// Test that a missing config file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.output.manifest_path, created.output.manifest_path);
    assert_eq!(loaded.synthesis.speakers, created.synthesis.speakers);
    Ok(())
}
