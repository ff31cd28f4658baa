//! Silent WAV authoring.
//!
//! Last-resort audio path: when no speech engine is available the
//! pipeline still needs a track of exactly the synthesized duration,
//! so we write zeroed 16kHz mono PCM with a proper RIFF header.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::MediaResult;

/// Sample rate of the silent track.
pub const SILENT_SAMPLE_RATE: u32 = 16_000;

/// Write a silent WAV of the given duration.
pub fn write_silent_wav(path: &Path, duration_ms: u64) -> MediaResult<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SILENT_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let num_samples = duration_ms * SILENT_SAMPLE_RATE as u64 / 1000;
    let mut writer = WavWriter::create(path, spec)?;
    for _ in 0..num_samples {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path, 1500).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, SILENT_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 1500 * SILENT_SAMPLE_RATE / 1000);
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_silent_wav(&path, 0).unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
