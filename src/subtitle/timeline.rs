/*!
 * Global timeline placement of per-clip subtitle blocks.
 *
 * The accumulator owns the running offset. Each clip is shifted by the
 * offset in effect when it is placed, then the offset advances by the clip's
 * measured duration plus the inter-clip gap. Everything is kept in whole
 * milliseconds so accumulated offsets carry no float drift.
 */

use log::{debug, warn};

use super::block::SubtitleBlock;
use super::timecode::{ms_to_seconds, seconds_to_ms};

/// Shift every cue of a block by `offset_seconds`; indices and text are untouched
pub fn shift(block: &SubtitleBlock, offset_seconds: f64) -> SubtitleBlock {
    block.shifted(seconds_to_ms(offset_seconds))
}

/// Running global offset over the clips of one run
#[derive(Debug, Clone)]
pub struct TimelineAccumulator {
    gap_ms: u64,
    offset_ms: u64,
    clips_placed: usize,
}

impl TimelineAccumulator {
    pub fn new(gap_seconds: f64) -> Self {
        Self {
            gap_ms: seconds_to_ms(gap_seconds),
            offset_ms: 0,
            clips_placed: 0,
        }
    }

    pub fn current_offset_seconds(&self) -> f64 {
        ms_to_seconds(self.offset_ms)
    }

    pub fn current_offset_ms(&self) -> u64 {
        self.offset_ms
    }

    pub fn gap_seconds(&self) -> f64 {
        ms_to_seconds(self.gap_ms)
    }

    pub fn clips_placed(&self) -> usize {
        self.clips_placed
    }

    /// Total spoken length: the offset without the trailing gap
    pub fn total_duration_seconds(&self) -> f64 {
        if self.clips_placed == 0 {
            return 0.0;
        }
        ms_to_seconds(self.offset_ms.saturating_sub(self.gap_ms))
    }

    /// Shift a block by the current offset without advancing
    pub fn shift_current(&self, block: &SubtitleBlock) -> SubtitleBlock {
        block.shifted(self.offset_ms)
    }

    /// Advance past a clip of the given measured duration; returns the new offset in seconds
    pub fn advance(&mut self, clip_duration_seconds: f64) -> f64 {
        self.offset_ms += seconds_to_ms(clip_duration_seconds) + self.gap_ms;
        self.clips_placed += 1;
        self.current_offset_seconds()
    }

    /// Place one clip's block on the global timeline and advance.
    ///
    /// Cues are confined to the clip's window `[offset, offset + duration + gap)`
    /// so a later clip always starts after every cue of an earlier one. Words
    /// transcribed past the window end are kept on a final 1ms cue.
    pub fn place(&mut self, block: &SubtitleBlock, clip_duration_seconds: f64) -> SubtitleBlock {
        let window_end = self.offset_ms + seconds_to_ms(clip_duration_seconds) + self.gap_ms;
        let shifted = self.shift_current(block);

        let late: Vec<&str> = shifted.cues
            .iter()
            .filter(|c| c.start_ms >= window_end)
            .map(|c| c.text.as_str())
            .collect();
        if !late.is_empty() {
            warn!(
                "Clip {} has words starting past its audio, pinned to its end: {:?}",
                self.clips_placed,
                late.join(" ")
            );
        }

        let placed = shifted.clamped(window_end);

        debug!(
            "Clip {} placed at {:.3}s ({} cues)",
            self.clips_placed,
            self.current_offset_seconds(),
            placed.len()
        );

        self.advance(clip_duration_seconds);
        placed
    }
}
