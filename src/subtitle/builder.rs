use log::warn;

use crate::transcription::WordTiming;

use super::block::{Cue, SubtitleBlock};
use super::timecode::seconds_to_ms;

/// Builds one clip-local cue per transcribed word.
///
/// A cue ends where the next word starts; the last cue ends at its own word's
/// end. Starts never move backwards, so the block stays ordered even when the
/// service reports overlapping words.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubtitleBlockBuilder;

impl SubtitleBlockBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, words: &[WordTiming]) -> SubtitleBlock {
        let words: Vec<&WordTiming> = words.iter().filter(|w| !w.text.trim().is_empty()).collect();
        let mut cues = Vec::with_capacity(words.len());
        let mut previous_end = 0u64;

        for (i, word) in words.iter().enumerate() {
            let start_ms = seconds_to_ms(word.start_seconds).max(previous_end);
            let own_end_ms = seconds_to_ms(word.end_seconds);

            let snapped = match words.get(i + 1) {
                Some(next) => seconds_to_ms(next.start_seconds),
                None => own_end_ms,
            };

            let end_ms = if snapped > start_ms {
                snapped
            } else if own_end_ms > start_ms {
                own_end_ms
            } else {
                warn!("Word {:?} has no usable duration, giving it 1ms", word.text);
                start_ms + 1
            };

            cues.push(Cue::new(i + 1, start_ms, end_ms, word.text.trim()));
            previous_end = end_ms;
        }

        SubtitleBlock::new(cues)
    }
}
