// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use dialogsync::app_config::{self, Config, GenerationProvider};
use dialogsync::app_controller::Controller;
use dialogsync::dialogue::DialogueSource;
use dialogsync::pipeline::PipelineRequest;

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenerationProvider {
    #[value(name = "openai")]
    OpenAI,
    Ollama,
    Anthropic,
}

impl From<CliGenerationProvider> for GenerationProvider {
    fn from(cli_provider: CliGenerationProvider) -> Self {
        match cli_provider {
            CliGenerationProvider::OpenAI => GenerationProvider::OpenAI,
            CliGenerationProvider::Ollama => GenerationProvider::Ollama,
            CliGenerationProvider::Anthropic => GenerationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate clips, subtitles and the renderer manifest (default command)
    Generate(GenerateArgs),

    /// Generate shell completions for dialogsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// First speaker, e.g. BARACK_OBAMA
    #[arg(long)]
    speaker_a: Option<String>,

    /// Second speaker, e.g. JOE_ROGAN
    #[arg(long)]
    speaker_b: Option<String>,

    /// Music token, or NONE
    #[arg(long, default_value = "NONE")]
    music: String,

    /// Topic handed to the generative service
    #[arg(short, long, conflicts_with = "script")]
    topic: Option<String>,

    /// Pre-written JSON script instead of a generated one
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Generative provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for generation
    #[arg(short, long)]
    model: Option<String>,

    /// Correct subtitle text against the script after transcription
    #[arg(long)]
    repair: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// dialogsync - two-speaker dialogue clips with word-timed subtitles
#[derive(Parser, Debug)]
#[command(name = "dialogsync")]
#[command(version = "0.1.0")]
#[command(about = "Turn a dialogue into voiced clips, word-level subtitles and a renderer manifest")]
#[command(long_about = "dialogsync obtains a two-speaker script (generated from a topic or read from a file),
voices every line with a reference-sample TTS engine, transcribes each clip for word timings
and writes subtitle files placed on one global timeline, plus a manifest for the renderer.

EXAMPLES:
    dialogsync --speaker-a BARACK_OBAMA --speaker-b JOE_ROGAN --topic \"interest rates\"
    dialogsync --speaker-a A --speaker-b B --script transcript.json --music LOFI
    dialogsync --repair -p ollama -m llama3.2 --speaker-a A --speaker-b B -t \"rust\"
    dialogsync completions bash > dialogsync.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't exist,
    a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the level is adjusted once config and CLI are known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dialogsync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => run_generate(cli.generate).await,
    }
}

/// Turn the parsed options into a pipeline request; exactly one dialogue source is required
fn build_request(options: &GenerateArgs) -> Result<PipelineRequest> {
    let speaker_a = options.speaker_a.clone().ok_or_else(|| anyhow!("--speaker-a is required"))?;
    let speaker_b = options.speaker_b.clone().ok_or_else(|| anyhow!("--speaker-b is required"))?;

    let source = match (&options.topic, &options.script) {
        (Some(_), Some(_)) => return Err(anyhow!("Provide only one of --topic or --script")),
        (None, None) => return Err(anyhow!("Provide one of --topic or --script")),
        (Some(topic), None) => DialogueSource::Topic(topic.clone()),
        (None, Some(script)) => DialogueSource::Script(script.clone()),
    };

    let request = PipelineRequest {
        source,
        speaker_a,
        speaker_b,
        music: options.music.clone(),
    };
    request.validate()?;

    info!("✔ speaker-a: {}", request.speaker_a);
    info!("✔ speaker-b: {}", request.speaker_b);
    info!("✔ music: {}", request.music);
    Ok(request)
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    // CLI input is validated before anything touches the disk
    let request = build_request(&options)?;

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.generation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.generation.set_model(model);
    }
    if options.repair {
        config.repair.enabled = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    controller.run(request).await?;

    Ok(())
}
