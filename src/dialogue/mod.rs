/*!
 * Dialogue scripts: entries, validation and acquisition.
 *
 * - `extract`: locating the structured payload inside free-form model output
 * - `prompts`: prompt construction for the generative service
 * - `acquirer`: script loading and the bounded retry loop
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PipelineError;

pub mod acquirer;
pub mod extract;
pub mod prompts;

pub use acquirer::{Delay, DialogueAcquirer, DialogueSource, NoDelay, RetryPolicy, TokioDelay};

// @const: Uppercase words joined by single underscores
static SPEAKER_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]+(_[A-Z]+)*$").unwrap()
});

/// Check a speaker id (or any other CLI token) against the uppercase-token pattern
pub fn is_speaker_token(token: &str) -> bool {
    SPEAKER_TOKEN_REGEX.is_match(token)
}

/// One line of the script, in speaking order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueEntry {
    #[serde(rename = "agentId")]
    pub speaker_id: String,
    pub text: String,
}

impl DialogueEntry {
    /// Create a validated entry; the text is stored trimmed
    pub fn new(speaker_id: impl Into<String>, text: impl Into<String>) -> Result<Self, PipelineError> {
        let speaker_id = speaker_id.into();
        let text = text.into();

        if !is_speaker_token(&speaker_id) {
            return Err(PipelineError::Validation(format!(
                "Invalid agentId {:?}: must match ^[A-Z]+(_[A-Z]+)*$",
                speaker_id
            )));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::Validation(format!(
                "Empty text for speaker {}",
                speaker_id
            )));
        }

        Ok(Self {
            speaker_id,
            text: trimmed.to_string(),
        })
    }
}

/// Validate a parsed script value: an array of `{agentId, text}` objects.
///
/// A single bad item rejects the whole script.
pub fn parse_dialogue(value: &Value) -> Result<Vec<DialogueEntry>, PipelineError> {
    let items = value.as_array().ok_or_else(|| {
        PipelineError::Validation(format!("Transcript must be an array, got {}", json_type_name(value)))
    })?;

    if items.is_empty() {
        return Err(PipelineError::Validation("Transcript contains no entries".to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let obj = item.as_object().ok_or_else(|| {
                PipelineError::Validation(format!("Item at index {} is not an object", idx))
            })?;

            let speaker_id = obj.get("agentId").and_then(Value::as_str).ok_or_else(|| {
                PipelineError::Validation(format!("Missing or non-string agentId at index {}", idx))
            })?;
            let text = obj.get("text").and_then(Value::as_str).ok_or_else(|| {
                PipelineError::Validation(format!("Missing or non-string text at index {}", idx))
            })?;

            DialogueEntry::new(speaker_id, text).map_err(|e| match e {
                PipelineError::Validation(msg) => PipelineError::Validation(format!("{} (index {})", msg, idx)),
                other => other,
            })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
