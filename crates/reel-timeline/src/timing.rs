//! Deterministic word-level timestamp synthesis and the audio gate.
//!
//! Timing is a pure function of the script text: each word gets a
//! base duration scaled by its scene's pacing multiplier, emphasized
//! words are stretched, and a short pause separates scenes. The
//! synthesized timeline is authoritative even when a real TTS engine
//! produces the audible track.

use reel_models::{Pacing, SceneKind, Script, WordTimestamp};

use crate::gate::GateReport;

/// Base duration of a single spoken word.
pub const BASE_WORD_MS: f64 = 300.0;

/// Stretch factor applied to emphasized words.
pub const EMPHASIS_STRETCH: f64 = 1.15;

/// Shortest allowed inter-scene pause.
pub const MIN_PAUSE_MS: f64 = 150.0;

/// Longest allowed inter-scene pause.
pub const MAX_PAUSE_MS: f64 = 450.0;

/// Largest tolerated silence between consecutive words.
pub const MAX_WORD_GAP_MS: u64 = 600;

/// Words that trigger emphasis regardless of context.
const EMPHASIS_LEXICON: [&str; 13] = [
    "but", "however", "instead", "secret", "hidden", "mastery", "always", "never", "must", "only",
    "stop", "start", "limit",
];

/// Apply the emphasis rule to a raw token: lower-case it, drop
/// non-alphanumeric characters, then check for digits or lexicon
/// membership.
pub fn is_emphasis_word(token: &str) -> bool {
    let normalized: String = token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if normalized.is_empty() {
        return false;
    }
    normalized.chars().any(|c| c.is_ascii_digit()) || EMPHASIS_LEXICON.contains(&normalized.as_str())
}

/// Pacing multiplier for a scene position.
pub fn scene_multiplier(kind: SceneKind, pacing: &Pacing) -> f64 {
    if kind.is_hook() {
        pacing.hook_multiplier
    } else if kind.is_ending() {
        pacing.ending_multiplier
    } else {
        pacing.body_multiplier
    }
}

/// Synthesized timing for one scene, scene-local milliseconds.
#[derive(Debug, Clone)]
pub struct SceneTiming {
    pub kind: SceneKind,
    /// Ordered, contiguous word stamps starting at 0
    pub timestamps: Vec<WordTimestamp>,
    /// End of the last word
    pub speech_ms: u64,
    /// `speech_ms` plus the trailing inter-scene pause (0 on the last scene)
    pub duration_ms: u64,
}

/// Timing for the whole script.
#[derive(Debug, Clone)]
pub struct ScriptTiming {
    pub scenes: Vec<SceneTiming>,
    /// Sum of scene durations
    pub total_ms: u64,
    pub pacing: Pacing,
}

impl ScriptTiming {
    /// Fold all scene timelines into one, offsetting each scene by the
    /// cumulative duration of the scenes before it. The final auditor
    /// consumes this union.
    pub fn union(&self) -> Vec<WordTimestamp> {
        let mut out = Vec::new();
        let mut offset = 0u64;
        for scene in &self.scenes {
            for stamp in &scene.timestamps {
                out.push(WordTimestamp::new(
                    stamp.word.clone(),
                    stamp.start_ms + offset,
                    stamp.end_ms + offset,
                    stamp.emphasis,
                ));
            }
            offset += scene.duration_ms;
        }
        out
    }
}

/// Synthesize the full timing model for a script.
pub fn synthesize_script_timing(script: &Script) -> ScriptTiming {
    let pacing = Pacing::default();
    let scene_count = script.scenes.len();
    let mut scenes = Vec::with_capacity(scene_count);
    let mut total_ms = 0u64;

    for (index, scene) in script.scenes.iter().enumerate() {
        let multiplier = scene_multiplier(scene.kind, &pacing);
        let mut cursor = 0u64;
        let mut timestamps = Vec::new();

        for token in scene.text.split_whitespace() {
            let emphasis = is_emphasis_word(token);
            let mut word_ms = BASE_WORD_MS * multiplier;
            if emphasis {
                word_ms *= EMPHASIS_STRETCH;
            }
            let word_ms = word_ms.round() as u64;
            timestamps.push(WordTimestamp::new(token, cursor, cursor + word_ms, emphasis));
            cursor += word_ms;
        }

        let speech_ms = cursor;
        let is_last = index + 1 == scene_count;
        let pause_ms = if is_last {
            0
        } else {
            (speech_ms as f64 * 0.15).clamp(MIN_PAUSE_MS, MAX_PAUSE_MS).round() as u64
        };
        let duration_ms = speech_ms + pause_ms;
        total_ms += duration_ms;

        scenes.push(SceneTiming {
            kind: scene.kind,
            timestamps,
            speech_ms,
            duration_ms,
        });
    }

    ScriptTiming {
        scenes,
        total_ms,
        pacing,
    }
}

/// Audio gate: ordering, overlap, silence gaps, total budget.
pub fn validate_timing(
    timestamps: &[WordTimestamp],
    duration_ms: u64,
    target_seconds: u32,
) -> GateReport {
    let mut report = GateReport::new();

    let budget_ms = (target_seconds as f64 * 1000.0 * 1.1) as u64;
    if duration_ms > budget_ms {
        report.push(format!(
            "Audio runs {duration_ms}ms, over the {budget_ms}ms budget"
        ));
    }

    for stamp in timestamps {
        if stamp.end_ms <= stamp.start_ms {
            report.push(format!(
                "Word \"{}\" has non-positive duration at {}ms",
                stamp.word, stamp.start_ms
            ));
        }
    }

    for pair in timestamps.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start_ms < prev.end_ms {
            report.push(format!(
                "Words \"{}\" and \"{}\" overlap at {}ms",
                prev.word, next.word, next.start_ms
            ));
        } else {
            let gap = next.start_ms - prev.end_ms;
            if gap > MAX_WORD_GAP_MS {
                report.push(format!("Massive silence gap detected: {gap}ms"));
            }
        }
    }

    report
}
