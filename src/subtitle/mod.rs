/*!
 * Subtitle blocks and their placement on the global timeline.
 *
 * - `timecode`: `HH:MM:SS,mmm` parsing and formatting
 * - `block`: cues, blocks and the SRT grammar
 * - `builder`: word timings to a clip-local block
 * - `timeline`: the running global offset
 * - `repair`: optional text correction against the script
 */

pub mod block;
pub mod builder;
pub mod repair;
pub mod timecode;
pub mod timeline;

pub use block::{Cue, SubtitleBlock};
pub use builder::SubtitleBlockBuilder;
pub use repair::{extract_subtitle_span, RepairJob, RepairOutcome, SubtitleRepairer};
pub use timecode::{seconds_to_srt_time, srt_time_to_seconds};
pub use timeline::{shift, TimelineAccumulator};
