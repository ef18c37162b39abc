//! `HH:MM:SS,mmm` timestamps.
//!
//! Times are held as whole milliseconds; conversion from seconds rounds to the
//! nearest millisecond so that seconds -> string -> seconds is exact at 3 decimals.

use anyhow::{anyhow, Context, Result};

/// Parse `HH:MM:SS,mmm` (a `.` separator is also accepted) to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if parts[3].len() != 3 || minutes >= 60 || seconds >= 60 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format milliseconds as `HH:MM:SS,mmm`
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Seconds to whole milliseconds; negative and non-finite values become 0
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

pub fn ms_to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

pub fn srt_time_to_seconds(timestamp: &str) -> Result<f64> {
    parse_timestamp(timestamp).map(ms_to_seconds)
}

pub fn seconds_to_srt_time(seconds: f64) -> String {
    format_timestamp(seconds_to_ms(seconds))
}
