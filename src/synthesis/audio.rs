use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Duration of a WAV file from its header, in seconds
pub fn wav_duration_seconds(path: &Path) -> Result<f64, hound::Error> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(0.0);
    }
    // duration() counts frames, so channel count does not matter
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Frame at which a clip starting `start_ms` into the track begins
pub fn ms_to_frames(start_ms: u64, sample_rate: u32) -> u64 {
    (start_ms * sample_rate as u64 + 500) / 1000
}

/// Join clips into one WAV track, each clip starting at its offset in ms.
///
/// The gaps before each clip are filled with silence. Every clip must share
/// the first clip's spec. Returns the number of frames written.
pub fn concatenate_clips(clips: &[(&Path, u64)], output: &Path) -> Result<u64, hound::Error> {
    let Some((first, _)) = clips.first() else {
        return Err(hound::Error::FormatError("no clips to concatenate"));
    };
    let spec = WavReader::open(first)?.spec();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WavWriter::create(output, spec)?;
    let channels = spec.channels as u64;
    let mut frames_written = 0u64;

    for (path, start_ms) in clips {
        let mut reader = WavReader::open(path)?;
        if reader.spec() != spec {
            return Err(hound::Error::FormatError("clips differ in channels, sample rate or sample format"));
        }
        let clip_frames = reader.duration() as u64;

        let silence = ms_to_frames(*start_ms, spec.sample_rate).saturating_sub(frames_written);
        for _ in 0..silence * channels {
            match spec.sample_format {
                SampleFormat::Float => writer.write_sample(0.0f32)?,
                SampleFormat::Int => writer.write_sample(0i32)?,
            }
        }

        match spec.sample_format {
            SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }

        frames_written += silence + clip_frames;
    }

    writer.finalize()?;
    Ok(frames_written)
}
