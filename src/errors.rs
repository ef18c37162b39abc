/*!
 * Error types for the dialogsync pipeline.
 *
 * This module contains custom error types for the external services and for
 * each pipeline stage, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the generative text or transcription services
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the pipeline stages.
///
/// Every variant except `Io` and `Provider` is fatal for the run and carries
/// enough context (stage, index, identifier) to resume narrowly.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed script or command line input, raised before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generative service never produced a valid script
    #[error("Failed to acquire a valid dialogue after {attempts} attempts for topic '{topic}': {last_error}")]
    AcquisitionFailed {
        topic: String,
        attempts: u32,
        last_error: String,
    },

    /// No reference sample is registered for the speaker
    #[error("No reference sample registered for speaker: {0}")]
    UnknownSpeaker(String),

    /// The registered reference sample does not exist on disk
    #[error("Reference sample for speaker {speaker} not found: {path:?}")]
    ReferenceMissing { speaker: String, path: PathBuf },

    /// The synthesis engine terminated abnormally
    #[error("Synthesis failed for clip {index} ({speaker}): {status}")]
    SynthesisFailed {
        index: usize,
        speaker: String,
        status: String,
    },

    /// The transcription service failed for one clip
    #[error("Transcription failed for clip {index} ({completed} clips completed): {message}")]
    TranscriptionFailed {
        index: usize,
        completed: usize,
        message: String,
    },

    /// A subtitle block could not be built or written
    #[error("Subtitle error for clip {index}: {message}")]
    Subtitle { index: usize, message: String },

    /// The clips could not be joined into the narrative audio track
    #[error("Narrative audio error: {0}")]
    Audio(String),

    /// File system error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// External service error outside of a retried stage
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl PipelineError {
    /// Short stage name used when reporting the failure
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::AcquisitionFailed { .. } => "acquisition",
            Self::UnknownSpeaker(_) | Self::ReferenceMissing { .. } | Self::SynthesisFailed { .. } => "synthesis",
            Self::TranscriptionFailed { .. } => "transcription",
            Self::Subtitle { .. } => "subtitles",
            Self::Audio(_) => "audio",
            Self::Io(_) => "io",
            Self::Provider(_) => "provider",
        }
    }

    /// Index of the clip that failed, when the failure is clip-scoped
    pub fn clip_index(&self) -> Option<usize> {
        match self {
            Self::SynthesisFailed { index, .. }
            | Self::TranscriptionFailed { index, .. }
            | Self::Subtitle { index, .. } => Some(*index),
            _ => None,
        }
    }
}
