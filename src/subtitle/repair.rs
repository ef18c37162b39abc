/*!
 * Optional correction of subtitle text against the script.
 *
 * A generative service is asked to fix the words of a noisy block using the
 * canonical line. Only cue text is ever taken from the response: timing and
 * indices always come from the noisy block, and any response that cannot be
 * lined up with it leaves the block as it was.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::dialogue::prompts::repair_prompt;
use crate::errors::ProviderError;
use crate::providers::TextGenerator;

use super::block::{has_time_range_marker, SubtitleBlock};

/// Usable SRT span of a response.
///
/// Runs from the first line with a time range marker through one line past the
/// last such line, prefixed with index `1`. `None` when no marker exists.
pub fn extract_subtitle_span(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();

    let first = lines.iter().position(|l| has_time_range_marker(l))?;
    let last_marker = lines.iter().rposition(|l| has_time_range_marker(l))?;
    let last = (last_marker + 1).min(lines.len() - 1);

    let mut span = Vec::with_capacity(last - first + 2);
    span.push("1");
    span.extend_from_slice(&lines[first..=last]);
    Some(span.join("\n"))
}

/// Result of one repair request
#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    /// Corrected texts applied onto the original timing
    Repaired(SubtitleBlock),
    /// The response held no subtitle span
    ExtractionEmpty,
    /// The response span could not be read as subtitles
    Unparseable(String),
    /// The response had a different number of cues than the block
    CueMismatch { expected: usize, found: usize },
    /// The service call itself failed
    ServiceFailed(String),
}

impl RepairOutcome {
    pub fn is_repaired(&self) -> bool {
        matches!(self, Self::Repaired(_))
    }

    /// The block to keep: the repaired one, or the original on any fallback
    pub fn resolve(self, original: &SubtitleBlock) -> SubtitleBlock {
        match self {
            Self::Repaired(block) => block,
            _ => original.clone(),
        }
    }
}

/// One block to repair, tagged with its clip index
#[derive(Debug, Clone)]
pub struct RepairJob {
    pub index: usize,
    pub canonical_text: String,
    pub block: SubtitleBlock,
}

/// Reconciles subtitle blocks against their script lines
#[derive(Clone)]
pub struct SubtitleRepairer {
    generator: Arc<dyn TextGenerator>,
    concurrent_requests: usize,
}

impl SubtitleRepairer {
    pub fn new(generator: Arc<dyn TextGenerator>, concurrent_requests: usize) -> Self {
        Self {
            generator,
            concurrent_requests: concurrent_requests.max(1),
        }
    }

    /// Ask for a corrected block; the result is the extracted span, empty when none was found
    pub async fn repair_text(&self, canonical_text: &str, noisy_block: &str) -> Result<String, ProviderError> {
        let prompt = repair_prompt(canonical_text, noisy_block);
        let response = self.generator.generate(&prompt).await?;
        Ok(extract_subtitle_span(&response).unwrap_or_default())
    }

    /// Repair one block, keeping its cue count, indices and timestamps
    pub async fn repair(&self, canonical_text: &str, block: &SubtitleBlock) -> RepairOutcome {
        let corrected = match self.repair_text(canonical_text, &block.render()).await {
            Ok(text) => text,
            Err(e) => return RepairOutcome::ServiceFailed(e.to_string()),
        };

        if corrected.is_empty() {
            return RepairOutcome::ExtractionEmpty;
        }

        let parsed = match SubtitleBlock::parse(&corrected) {
            Ok(parsed) => parsed,
            Err(e) => return RepairOutcome::Unparseable(e.to_string()),
        };

        if let Some(blank) = parsed.cues.iter().find(|c| c.text.trim().is_empty()) {
            return RepairOutcome::Unparseable(format!("cue {} has no text", blank.index));
        }

        let found = parsed.len();
        let texts = parsed.cues.into_iter().map(|c| c.text).collect();
        match block.with_texts(texts) {
            Some(repaired) => RepairOutcome::Repaired(repaired),
            None => RepairOutcome::CueMismatch {
                expected: block.len(),
                found,
            },
        }
    }

    /// Repair every job concurrently; outcomes come back in job order
    pub async fn repair_all(&self, jobs: &[RepairJob]) -> Vec<(usize, RepairOutcome)> {
        info!("Repairing {} subtitle blocks", jobs.len());

        let mut results = stream::iter(jobs.iter())
            .map(|job| async move {
                let outcome = self.repair(&job.canonical_text, &job.block).await;
                match &outcome {
                    RepairOutcome::Repaired(_) => debug!("Clip {} repaired", job.index),
                    other => warn!("Clip {} left unrepaired: {:?}", job.index, other),
                }
                (job.index, outcome)
            })
            .buffer_unordered(self.concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(index, _)| *index);
        results
    }
}
