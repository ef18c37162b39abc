/*!
 * Speech synthesis for dialogue lines.
 *
 * - `speakers`: reference sample registry and the run-scoped resolution cache
 * - `engine`: the out-of-process synthesis engine
 * - `audio`: duration measurement and joining of written clips
 * - `synthesizer`: one line in, one measured `AudioClip` out
 */

pub mod audio;
pub mod engine;
pub mod speakers;
pub mod synthesizer;

pub use audio::{concatenate_clips, wav_duration_seconds};
pub use engine::{clip_path, CommandEngine, EngineFailure, SynthesisEngine, SynthesisJob};
pub use speakers::{ReferenceCache, SpeakerReferences, SpeakerRegistry};
pub use synthesizer::{AudioClip, SpeakerAudioSynthesizer};
