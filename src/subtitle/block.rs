use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

use crate::file_utils::FileManager;

use super::timecode::{format_timestamp, parse_timestamp};

// @const: SRT time range line
static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

// @struct: Single timed cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: 1-based position in its block
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cue text
    pub text: String,
}

impl Cue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start_ms)
    }

    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end_ms)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered cues of one clip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleBlock {
    pub cues: Vec<Cue>,
}

impl SubtitleBlock {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cues.iter().map(|c| c.text.as_str()).collect()
    }

    /// Check contiguous 1-based indices, positive durations and ordering
    pub fn validate(&self) -> Result<()> {
        for (i, cue) in self.cues.iter().enumerate() {
            if cue.index != i + 1 {
                return Err(anyhow!("Cue at position {} has index {}", i + 1, cue.index));
            }
            if cue.end_ms <= cue.start_ms {
                return Err(anyhow!(
                    "Invalid time range in cue {}: end time {} <= start time {}",
                    cue.index, cue.end_ms, cue.start_ms
                ));
            }
        }

        for pair in self.cues.windows(2) {
            if pair[1].start_ms < pair[0].end_ms {
                return Err(anyhow!("Cue {} overlaps cue {}", pair[1].index, pair[0].index));
            }
        }

        Ok(())
    }

    /// Same block with every timestamp moved forward by `offset_ms`
    pub fn shifted(&self, offset_ms: u64) -> Self {
        Self::new(
            self.cues
                .iter()
                .map(|c| Cue::new(c.index, c.start_ms + offset_ms, c.end_ms + offset_ms, c.text.clone()))
                .collect(),
        )
    }

    /// Confine every cue to end by `limit_ms`.
    ///
    /// Ends are cut to the limit. Cues starting at or past it are folded into
    /// one last cue `[limit_ms - 1, limit_ms)` so their text stays in the block.
    pub fn clamped(&self, limit_ms: u64) -> Self {
        if limit_ms == 0 {
            return Self::default();
        }

        let (mut cues, late): (Vec<Cue>, Vec<Cue>) = self.cues
            .iter()
            .cloned()
            .partition(|c| c.start_ms < limit_ms);

        for cue in cues.iter_mut() {
            cue.end_ms = cue.end_ms.min(limit_ms);
        }

        if !late.is_empty() {
            let late_text = late.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
            let tail_start = limit_ms - 1;

            let last_at_limit = cues.last().is_some_and(|c| c.start_ms >= tail_start);
            if let Some(last) = cues.last_mut() {
                if last_at_limit {
                    last.text.push(' ');
                    last.text.push_str(&late_text);
                } else {
                    last.end_ms = last.end_ms.min(tail_start);
                }
            }
            if !last_at_limit {
                cues.push(Cue::new(0, tail_start, limit_ms, late_text));
            }
        }

        for (i, cue) in cues.iter_mut().enumerate() {
            cue.index = i + 1;
        }

        Self::new(cues)
    }

    /// Same timing with replacement texts; `None` when the counts differ
    pub fn with_texts(&self, texts: Vec<String>) -> Option<Self> {
        if texts.len() != self.cues.len() {
            return None;
        }

        Some(Self::new(
            self.cues
                .iter()
                .zip(texts)
                .map(|(c, text)| Cue::new(c.index, c.start_ms, c.end_ms, text))
                .collect(),
        ))
    }

    /// Render in SRT grammar
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Parse SRT text; cues are renumbered 1..N in order of appearance.
    ///
    /// A digits-only line directly followed by a time range is taken as an
    /// index line, anything else after a time range is cue text.
    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();
        let mut cues: Vec<Cue> = Vec::new();

        for (line_no, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = TIME_RANGE_REGEX.captures(line) {
                let start_ms = parse_timestamp(&caps[1])
                    .with_context(|| format!("Bad start time at line {}", line_no + 1))?;
                let end_ms = parse_timestamp(&caps[2])
                    .with_context(|| format!("Bad end time at line {}", line_no + 1))?;
                cues.push(Cue::new(cues.len() + 1, start_ms, end_ms, String::new()));
                continue;
            }

            let next_is_range = lines[line_no + 1..]
                .iter()
                .find(|l| !l.is_empty())
                .is_some_and(|l| TIME_RANGE_REGEX.is_match(l));
            if next_is_range && line.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            match cues.last_mut() {
                Some(cue) => {
                    if !cue.text.is_empty() {
                        cue.text.push('\n');
                    }
                    cue.text.push_str(line);
                }
                None => return Err(anyhow!("Unexpected text before the first time range at line {}: {}", line_no + 1, line)),
            }
        }

        Ok(Self::new(cues))
    }

    /// Write the block to an SRT file, creating the parent directory if needed
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_to_file(path, &self.render())
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cue in &self.cues {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}

/// Whether a line carries an SRT time range marker
pub fn has_time_range_marker(line: &str) -> bool {
    line.contains("-->")
}
