use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::dialogue::is_speaker_token;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Generative text service config
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Dialogue acquisition retry policy
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Speech synthesis engine config
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Transcription service config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Timeline assembly config
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Optional subtitle repair pass
    #[serde(default)]
    pub repair: RepairConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Generative text provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Any OpenAI-compatible endpoint (OpenAI, OpenRouter, LM Studio)
    #[default]
    OpenAI,
    // @provider: Ollama
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Whether requests must carry an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Generative text service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens to generate per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl GenerationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.model.is_empty() => p.model.clone(),
            _ => default_model(&self.provider),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(p) if !p.endpoint.is_empty() => p.endpoint.clone(),
            _ => default_endpoint(&self.provider),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Override the model of the active provider, adding its entry if missing
    pub fn set_model(&mut self, model: &str) {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(p) = self.available_providers.iter_mut().find(|p| p.provider_type == provider_str) {
            p.model = model.to_string();
        } else {
            let mut p = ProviderConfig::new(self.provider.clone());
            p.model = model.to_string();
            self.available_providers.push(p);
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(GenerationProvider::OpenAI),
                ProviderConfig::new(GenerationProvider::Ollama),
                ProviderConfig::new(GenerationProvider::Anthropic),
            ],
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Bounded retry policy for dialogue acquisition
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AcquisitionConfig {
    /// Total attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Upper bound on exchanges requested in the prompt
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            max_exchanges: default_max_exchanges(),
        }
    }
}

/// Speech synthesis engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Executable that runs the synthesis script
    #[serde(default = "default_synthesis_command")]
    pub command: String,

    /// Script passed as first argument to the command
    #[serde(default = "default_synthesis_script")]
    pub script: String,

    /// Language code passed to the engine
    #[serde(default = "default_language")]
    pub language: String,

    /// Directory holding the speaker reference samples
    #[serde(default = "default_reference_dir")]
    pub reference_dir: PathBuf,

    /// Reference sample file name per speaker
    #[serde(default = "default_speakers")]
    pub speakers: BTreeMap<String, String>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            command: default_synthesis_command(),
            script: default_synthesis_script(),
            language: default_language(),
            reference_dir: default_reference_dir(),
            speakers: default_speakers(),
        }
    }
}

/// Transcription service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Full URL of the transcription route
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_transcription_endpoint(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// Timeline assembly configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimelineConfig {
    /// Silence inserted between consecutive clips, in seconds
    #[serde(default = "default_gap_secs")]
    pub gap_secs: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { gap_secs: default_gap_secs() }
    }
}

/// Subtitle repair pass configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RepairConfig {
    /// Whether to run the repair pass after timeline assembly
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of repair requests in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Output file locations consumed by the renderer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory receiving synthesized clips
    #[serde(default = "default_voice_dir")]
    pub voice_dir: PathBuf,

    /// Directory receiving per-clip subtitle files
    #[serde(default = "default_subtitle_dir")]
    pub subtitle_dir: PathBuf,

    /// Narrative audio track joining every clip on the global timeline
    #[serde(default = "default_audio_path")]
    pub audio_path: PathBuf,

    /// Manifest file path
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Background video referenced by the manifest
    #[serde(default = "default_background_video")]
    pub background_video: String,

    /// Renderer video mode
    #[serde(default = "default_video_mode")]
    pub video_mode: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            voice_dir: default_voice_dir(),
            subtitle_dir: default_subtitle_dir(),
            audio_path: default_audio_path(),
            manifest_path: default_manifest_path(),
            background_video: default_background_video(),
            video_mode: default_video_mode(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    15
}

fn default_max_exchanges() -> u32 {
    7
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_gap_secs() -> f64 {
    0.2
}

fn default_model(provider: &GenerationProvider) -> String {
    match provider {
        GenerationProvider::OpenAI => "deepseek/deepseek-r1:free".to_string(),
        GenerationProvider::Ollama => "llama3.2:3b".to_string(),
        GenerationProvider::Anthropic => "claude-3-haiku".to_string(),
    }
}

fn default_endpoint(provider: &GenerationProvider) -> String {
    match provider {
        GenerationProvider::OpenAI => "https://openrouter.ai/api/v1".to_string(),
        GenerationProvider::Ollama => "http://localhost:11434".to_string(),
        GenerationProvider::Anthropic => "https://api.anthropic.com".to_string(),
    }
}

fn default_synthesis_command() -> String {
    "python3".to_string()
}

fn default_synthesis_script() -> String {
    "xtts_generate.py".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_reference_dir() -> PathBuf {
    PathBuf::from("../training_audio")
}

fn default_speakers() -> BTreeMap<String, String> {
    [
        ("JOE_ROGAN", "jreaudio.mp3"),
        ("BARACK_OBAMA", "obama.mp3"),
        ("BEN_SHAPIRO", "benshapiroaudio.mp3"),
        ("DONALD_TRUMP", "trumpaudio.mp3"),
        ("JOE_BIDEN", "joebidenaudio.mp3"),
        ("KAMALA_HARRIS", "kamala.mp3"),
        ("ANDREW_TATE", "tate.mp3"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_transcription_endpoint() -> String {
    "http://localhost:5000/transcribe".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_voice_dir() -> PathBuf {
    PathBuf::from("public/voice")
}

fn default_subtitle_dir() -> PathBuf {
    PathBuf::from("public/srt")
}

fn default_audio_path() -> PathBuf {
    PathBuf::from("public/audio.wav")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("src/tmp/context.json")
}

fn default_background_video() -> String {
    "/background/MINECRAFT-0.mp4".to_string()
}

fn default_video_mode() -> String {
    "normal".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.synthesis.language)?;

        if self.acquisition.max_attempts == 0 {
            return Err(anyhow!("acquisition.max_attempts must be at least 1"));
        }

        if !self.timeline.gap_secs.is_finite() || self.timeline.gap_secs < 0.0 {
            return Err(anyhow!("timeline.gap_secs must be a non-negative number, got {}", self.timeline.gap_secs));
        }

        if self.repair.concurrent_requests == 0 {
            return Err(anyhow!("repair.concurrent_requests must be at least 1"));
        }

        if let Some(bad) = self.synthesis.speakers.keys().find(|s| !is_speaker_token(s)) {
            return Err(anyhow!("Invalid speaker id in synthesis.speakers: {}", bad));
        }

        Ok(())
    }

    /// Check that the generative service is usable; only needed when a run talks to it
    pub fn validate_generation(&self) -> Result<()> {
        if self.generation.provider.requires_api_key() && self.generation.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider",
                self.generation.provider.display_name()
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load the configuration file, writing the defaults there first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}
