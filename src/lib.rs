/*!
 * # dialogsync - two-speaker dialogue to voiced clips and timed subtitles
 *
 * A Rust library that turns a short dialogue between two speakers into
 * per-line audio clips, word-level subtitle files on one global timeline,
 * and a manifest consumed by an external video renderer.
 *
 * ## Features
 *
 * - Dialogue scripts from a JSON file or generated from a topic by an LLM:
 *   - OpenAI-compatible APIs (OpenRouter, LM Studio, ...)
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Reference-sample speech synthesis through an external engine
 * - Word timestamps from a whisper transcription server
 * - Subtitle blocks with cue ends snapped to the next word's onset
 * - Exact, sequential global offsets from measured clip durations
 * - Optional subtitle text repair against the script
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `dialogue`: Script entries, payload extraction and the acquisition retry loop
 * - `synthesis`: Speaker references, the synthesis engine and clip measurement
 * - `transcription`: Word-level transcription of clips
 * - `subtitle`: Timecodes, blocks, the builder, the timeline and repair
 * - `manifest`: The renderer's context record
 * - `pipeline`: The end-to-end run
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod dialogue;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod manifest;
pub mod pipeline;
pub mod providers;
pub mod subtitle;
pub mod synthesis;
pub mod transcription;

// Re-export main types for easier usage
pub use app_config::Config;
pub use dialogue::{DialogueAcquirer, DialogueEntry, DialogueSource};
pub use errors::{PipelineError, ProviderError};
pub use manifest::Manifest;
pub use pipeline::{Pipeline, PipelineReport, PipelineRequest};
pub use subtitle::{SubtitleBlock, SubtitleBlockBuilder, TimelineAccumulator};
pub use synthesis::{AudioClip, SpeakerAudioSynthesizer};
pub use transcription::{ClipTranscriber, WordTiming};
