/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use dialogsync::errors::{PipelineError, ProviderError};

#[test]
fn test_providerError_fromStatus_shouldMapAuthAndRateLimit() {
    assert!(matches!(ProviderError::from_status(401, "no".into()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "no".into()), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow".into()), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(500, "boom".into()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_pipelineError_acquisitionFailed_shouldNameTheTopic() {
    let error = PipelineError::AcquisitionFailed {
        topic: "tax policy".to_string(),
        attempts: 5,
        last_error: "malformed payload".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("tax policy"));
    assert!(display.contains("5 attempts"));
    assert_eq!(error.stage(), "acquisition");
    assert_eq!(error.clip_index(), None);
}

#[test]
fn test_pipelineError_clipScopedErrors_shouldExposeTheIndex() {
    let synthesis = PipelineError::SynthesisFailed {
        index: 3,
        speaker: "A".to_string(),
        status: "XTTS exited with code 1".to_string(),
    };
    assert_eq!(synthesis.stage(), "synthesis");
    assert_eq!(synthesis.clip_index(), Some(3));

    let transcription = PipelineError::TranscriptionFailed {
        index: 2,
        completed: 2,
        message: "timeout".to_string(),
    };
    assert_eq!(transcription.stage(), "transcription");
    assert_eq!(transcription.clip_index(), Some(2));
    assert!(transcription.to_string().contains("2 clips completed"));
}

#[test]
fn test_pipelineError_speakerErrors_shouldBelongToSynthesis() {
    let unknown = PipelineError::UnknownSpeaker("NOBODY".to_string());
    let missing = PipelineError::ReferenceMissing {
        speaker: "A".to_string(),
        path: PathBuf::from("ref/a.mp3"),
    };
    assert_eq!(unknown.stage(), "synthesis");
    assert_eq!(missing.stage(), "synthesis");
    assert!(missing.to_string().contains("ref/a.mp3"));
}

#[test]
fn test_pipelineError_fromIoError_shouldConvert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: PipelineError = io.into();
    assert!(matches!(error, PipelineError::Io(_)));
    assert_eq!(error.stage(), "io");
}

#[test]
fn test_pipelineError_audio_shouldNotBeClipScoped() {
    let error = PipelineError::Audio("clips differ in channels, sample rate or sample format".to_string());
    assert_eq!(error.stage(), "audio");
    assert_eq!(error.clip_index(), None);
    assert!(error.to_string().starts_with("Narrative audio error"));
}
