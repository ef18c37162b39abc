/*!
 * Tests for timecodes, block building, timeline placement and repair extraction
 */

use dialogsync::subtitle::block::{Cue, SubtitleBlock};
use dialogsync::subtitle::timecode::{format_timestamp, parse_timestamp};
use dialogsync::subtitle::{
    extract_subtitle_span, seconds_to_srt_time, shift, srt_time_to_seconds, SubtitleBlockBuilder,
    TimelineAccumulator,
};
use dialogsync::transcription::WordTiming;

/// Test that HH:MM:SS,mmm survives a trip through seconds, up past one hour
#[test]
fn test_srt_time_roundTrip_withFullRange_shouldBeIdentical() {
    for ms in (0..=3_700_000u64).step_by(997) {
        let text = format_timestamp(ms);
        let seconds = srt_time_to_seconds(&text).unwrap();
        assert_eq!(seconds_to_srt_time(seconds), text, "round trip failed for {}", text);
        assert_eq!(parse_timestamp(&text).unwrap(), ms);
    }

    for text in ["00:00:00,000", "00:00:02,200", "00:59:59,999", "01:00:00,000", "10:20:30,405"] {
        assert_eq!(seconds_to_srt_time(srt_time_to_seconds(text).unwrap()), text);
    }
}

/// Test that cue ends snap to the next word's start
#[test]
fn test_builder_withThreeWords_shouldSnapEndsToNextStart() {
    let words = vec![
        WordTiming::new("one", 0.0, 0.9),
        WordTiming::new("two", 1.2, 2.1),
        WordTiming::new("three", 2.5, 3.0),
    ];

    let block = SubtitleBlockBuilder::new().build(&words);
    let ends: Vec<String> = block.cues.iter().map(|c| c.format_end_time()).collect();
    let indices: Vec<usize> = block.cues.iter().map(|c| c.index).collect();

    assert_eq!(ends, vec!["00:00:01,200", "00:00:02,500", "00:00:03,000"]);
    assert_eq!(indices, vec![1, 2, 3]);
}

/// Test the rendered block grammar
#[test]
fn test_builder_render_shouldUseStandardGrammar() {
    let block = SubtitleBlockBuilder::new().build(&[WordTiming::new("hello", 0.0, 0.45)]);
    assert_eq!(block.render(), "1\n00:00:00,000 --> 00:00:00,450\nhello\n\n");
}

/// Test offsets accumulate measured durations plus the gap, and cues stay inside their window
#[test]
fn test_timeline_withThreeClips_shouldAccumulateOffsetsMonotonically() {
    let durations = [1.8, 2.35, 0.9];
    let gap = 0.2;
    let mut timeline = TimelineAccumulator::new(gap);

    let local = SubtitleBlockBuilder::new().build(&[
        WordTiming::new("a", 0.0, 0.3),
        WordTiming::new("b", 0.4, 0.8),
        WordTiming::new("c", 0.85, 0.9),
    ]);

    let mut offsets = Vec::new();
    let mut placed = Vec::new();
    for duration in durations {
        offsets.push(timeline.current_offset_ms());
        placed.push(timeline.place(&local, duration));
    }
    offsets.push(timeline.current_offset_ms());

    assert_eq!(&offsets[..3], &[0, 2_000, 4_550]);
    for (k, block) in placed.iter().enumerate() {
        for cue in &block.cues {
            assert!(cue.start_ms >= offsets[k]);
            assert!(cue.start_ms < offsets[k + 1]);
        }
        assert!(block.validate().is_ok());
    }
}

/// Test that a word transcribed past the clip window keeps its text
#[test]
fn test_timeline_withWordPastWindow_shouldKeepItsText() {
    let mut timeline = TimelineAccumulator::new(0.2);
    let local = SubtitleBlockBuilder::new().build(&[
        WordTiming::new("hello", 0.0, 0.6),
        WordTiming::new("world", 1.25, 1.5),
    ]);

    let placed = timeline.place(&local, 1.0);

    assert_eq!(placed.texts(), vec!["hello", "world"]);
    assert_eq!(placed.cues[1].index, 2);
    assert_eq!(placed.cues[0].format_end_time(), "00:00:01,199");
    assert_eq!(placed.cues[1].format_start_time(), "00:00:01,199");
    assert_eq!(placed.cues[1].format_end_time(), "00:00:01,200");
    assert!(placed.validate().is_ok());
    assert_eq!(timeline.current_offset_ms(), 1_200);
}

/// Test that shifting touches only timestamps
#[test]
fn test_shift_withOffset_shouldKeepIndexAndText() {
    let block = SubtitleBlock::new(vec![Cue::new(1, 0, 500, "hi"), Cue::new(2, 500, 1_000, "there")]);
    let shifted = shift(&block, 2.2);

    assert_eq!(shifted.texts(), block.texts());
    assert_eq!(shifted.cues[0].format_start_time(), "00:00:02,200");
    assert_eq!(shifted.cues[1].format_end_time(), "00:00:03,200");
    assert_eq!(shifted.cues[1].index, 2);
}

/// Test the repair span rule
#[test]
fn test_extract_subtitle_span_withMarkersOnLinesThreeAndSeven_shouldCoverThreeToEight() {
    let response = [
        "Here is the corrected SRT:",
        "",
        "00:00:00,000 --> 00:00:00,500",
        "Hello",
        "",
        "2",
        "00:00:00,500 --> 00:00:01,000",
        "world",
        "",
        "Let me know if you need anything else.",
    ]
    .join("\n");

    let span = extract_subtitle_span(&response).unwrap();
    assert_eq!(
        span,
        "1\n00:00:00,000 --> 00:00:00,500\nHello\n\n2\n00:00:00,500 --> 00:00:01,000\nworld"
    );

    let parsed = SubtitleBlock::parse(&span).unwrap();
    assert_eq!(parsed.texts(), vec!["Hello", "world"]);
}

/// Test that a response without markers yields nothing
#[test]
fn test_extract_subtitle_span_withoutMarker_shouldBeEmpty() {
    assert!(extract_subtitle_span("I could not find any subtitles.\nSorry!").is_none());
    assert!(extract_subtitle_span("").is_none());
}
