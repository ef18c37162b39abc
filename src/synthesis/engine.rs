/*!
 * Out-of-process speech synthesis.
 *
 * The engine is invoked as `<command> <script> <text> <reference> <language> <output>`.
 * Its stdout/stderr are relayed to the log line by line; only the exit status
 * decides success.
 */

use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Prefix of relayed engine output
const LOG_TAG: &str = "XTTS";

/// Everything the engine needs to render one line
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisJob {
    pub text: String,
    pub reference: PathBuf,
    pub language: String,
    pub output: PathBuf,
}

/// Abnormal termination of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFailure {
    pub status: String,
}

impl std::fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status)
    }
}

/// Renders one line of text to an audio file
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    async fn synthesize(&self, job: &SynthesisJob) -> Result<(), EngineFailure>;
}

/// Engine backed by a subordinate process
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    leading_args: Vec<String>,
}

impl CommandEngine {
    /// `program` is run with `leading_args` followed by the job's positional arguments
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// The default `python3 xtts_generate.py ...` layout
    pub fn python_script(command: impl Into<String>, script: impl Into<String>) -> Self {
        Self::new(command, vec![script.into()])
    }

    fn arguments(&self, job: &SynthesisJob) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(job.text.clone());
        args.push(job.reference.to_string_lossy().to_string());
        args.push(job.language.clone());
        args.push(job.output.to_string_lossy().to_string());
        args
    }
}

async fn relay_lines<R: AsyncRead + Unpin>(reader: R, tag: &str, is_stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            warn!("[{} ERROR] {}", tag, line);
        } else {
            info!("[{}] {}", tag, line);
        }
    }
}

#[async_trait]
impl SynthesisEngine for CommandEngine {
    async fn synthesize(&self, job: &SynthesisJob) -> Result<(), EngineFailure> {
        let mut child = Command::new(&self.program)
            .args(self.arguments(job))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineFailure {
                status: format!("failed to start {}: {}", self.program, e),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let relay_out = async {
            if let Some(out) = stdout {
                relay_lines(out, LOG_TAG, false).await;
            }
        };
        let relay_err = async {
            if let Some(err) = stderr {
                relay_lines(err, LOG_TAG, true).await;
            }
        };
        let (_, _, status) = tokio::join!(relay_out, relay_err, child.wait());

        let status = status.map_err(|e| EngineFailure {
            status: format!("failed to wait for {}: {}", self.program, e),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(EngineFailure {
                status: match status.code() {
                    Some(code) => format!("{} exited with code {}", LOG_TAG, code),
                    None => format!("{} terminated by signal", LOG_TAG),
                },
            })
        }
    }
}

/// Deterministic clip path: `<dir>/<SPEAKER>-<index>.wav`
pub fn clip_path(voice_dir: &Path, speaker_id: &str, index: usize) -> PathBuf {
    voice_dir.join(format!("{}-{}.wav", speaker_id, index))
}
