//! Word-level audio timings and pacing metadata.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single narrated word with its position on the audio timeline.
///
/// Timestamps are scene-local milliseconds; the worker offsets them
/// when folding scenes into the whole-video timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTimestamp {
    /// The spoken token, stripped of surrounding whitespace
    pub word: String,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Raised by the deterministic emphasis rule; stretches the word
    /// and isolates it in the edit plan
    pub emphasis: bool,
}

impl WordTimestamp {
    pub fn new(word: impl Into<String>, start_ms: u64, end_ms: u64, emphasis: bool) -> Self {
        Self {
            word: word.into(),
            start_ms,
            end_ms,
            emphasis,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Duration multipliers applied per scene position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    pub hook_multiplier: f64,
    pub body_multiplier: f64,
    pub ending_multiplier: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            hook_multiplier: 0.8,
            body_multiplier: 1.0,
            ending_multiplier: 1.2,
        }
    }
}

/// Synthesized narration for one scene.
///
/// The word timestamps come from the deterministic timing model and
/// are authoritative regardless of which synthesis path produced the
/// audio file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioResult {
    /// Path to the synthesized WAV/MP3 on disk
    pub audio_path: PathBuf,
    /// Ordered, non-overlapping word timestamps
    pub timestamps: Vec<WordTimestamp>,
    /// Total scene duration, including the trailing inter-scene pause
    pub duration_ms: u64,
    pub pacing: Pacing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_duration() {
        let w = WordTimestamp::new("but", 300, 645, true);
        assert_eq!(w.duration_ms(), 345);
    }

    #[test]
    fn test_default_pacing() {
        let p = Pacing::default();
        assert!((p.hook_multiplier - 0.8).abs() < f64::EPSILON);
        assert!((p.ending_multiplier - 1.2).abs() < f64::EPSILON);
    }
}
