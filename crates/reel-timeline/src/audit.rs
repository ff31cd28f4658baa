//! Final GO/NO-GO quality audit.
//!
//! Runs after every scene has rendered, over the aggregated script
//! and the union word timeline. Any reason fails the job.

use reel_models::{Script, WordTimestamp};

use crate::script_gate::matches_curiosity_pattern;

/// Words that make the opening grab attention.
const GRAB_WORDS: [&str; 7] = ["but", "wrong", "lie", "secret", "nobody", "stop", "failed"];

/// Words that signal the video takes a stance.
const STANCE_MARKERS: [&str; 7] = [
    "isnt", "is not", "problem", "truth", "lies", "failed", "shouldnt",
];

/// Phrases that make the ending read as a polite sign-off.
const POLITE_ENDINGS: [&str; 5] = [
    "summary",
    "conclude",
    "in conclusion",
    "thank you",
    "follow for more",
];

/// Number of words per pacing window.
const PACING_WINDOW_WORDS: usize = 5;

/// Words-per-second delta below which two windows count as uniform.
const PACING_DELTA_WPS: f64 = 0.2;

/// Seconds of uninterrupted uniform pacing that triggers a NO-GO.
const PACING_BUDGET_SECS: f64 = 4.0;

/// Aggregated metadata the auditor consumes.
#[derive(Debug)]
pub struct AuditInput<'a> {
    pub script: &'a Script,
    /// Union word timeline across all scenes, video-global offsets
    pub timestamps: &'a [WordTimestamp],
}

/// Audit outcome.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// True when every heuristic passed
    pub go: bool,
    /// NO-GO reasons, empty on GO
    pub reasons: Vec<String>,
}

/// Lower-case and strip apostrophes so "isn't" matches "isnt".
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\'', '\u{2019}'], "")
}

/// Run the final audit.
pub fn audit(input: &AuditInput<'_>) -> Verdict {
    let mut reasons = Vec::new();

    // A1: the hook must grab within the first beat
    let hook = normalize(input.script.hook());
    let grabs = GRAB_WORDS.iter().any(|w| hook.contains(w))
        || matches_curiosity_pattern(input.script.hook());
    if !grabs {
        reasons.push("First 2 seconds feel skippable".to_string());
    }

    // A2: pacing must vary
    if uniform_pacing_secs(input.timestamps) > PACING_BUDGET_SECS {
        reasons.push("Pacing feels uniform".to_string());
    }

    // A3: the video must take a stance somewhere
    let full_text = normalize(&input.script.full_text());
    if !STANCE_MARKERS.iter().any(|m| full_text.contains(m)) {
        reasons.push("Video feels neutral and safe".to_string());
    }

    // A4: the ending must not wrap up politely
    let ending = normalize(input.script.ending());
    if POLITE_ENDINGS.iter().any(|p| ending.contains(p)) {
        reasons.push(
            "Video feels complete/polite instead of intentionally unfinished".to_string(),
        );
    }

    Verdict {
        go: reasons.is_empty(),
        reasons,
    }
}

/// Longest run of consecutive same-speed windows, in seconds.
///
/// The timeline is chunked into windows of [`PACING_WINDOW_WORDS`]
/// words; a window whose words-per-second sits within
/// [`PACING_DELTA_WPS`] of the previous window's extends the run.
fn uniform_pacing_secs(timestamps: &[WordTimestamp]) -> f64 {
    let windows: Vec<(f64, f64)> = timestamps
        .chunks(PACING_WINDOW_WORDS)
        .filter(|chunk| chunk.len() == PACING_WINDOW_WORDS)
        .map(|chunk| {
            let span_secs =
                (chunk.last().unwrap().end_ms - chunk[0].start_ms) as f64 / 1000.0;
            let wps = PACING_WINDOW_WORDS as f64 / span_secs;
            (wps, span_secs)
        })
        .collect();

    let mut longest = 0.0f64;
    let mut accumulated = 0.0f64;
    for pair in windows.windows(2) {
        let ((prev_wps, _), (wps, span_secs)) = (pair[0], pair[1]);
        if (wps - prev_wps).abs() < PACING_DELTA_WPS {
            accumulated += span_secs;
            longest = longest.max(accumulated);
        } else {
            accumulated = 0.0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{Scene, SceneKind, Script};

    fn script(hook: &str, body: &str, ending: &str) -> Script {
        let scenes = SceneKind::ORDERED
            .iter()
            .map(|kind| {
                let text = if kind.is_hook() {
                    hook.to_string()
                } else if kind.is_ending() {
                    ending.to_string()
                } else {
                    body.to_string()
                };
                Scene::new(*kind, text, vec!["coffee".into(), "brain".into()])
            })
            .collect();
        Script::new(scenes)
    }

    fn varied_timestamps() -> Vec<WordTimestamp> {
        // Alternate fast and slow words so no two windows pace alike
        let mut out = Vec::new();
        let mut cursor = 0u64;
        for i in 0..30u64 {
            let dur = if (i / 5) % 2 == 0 { 240 } else { 400 };
            out.push(WordTimestamp::new(
                format!("w{i}"),
                cursor,
                cursor + dur,
                false,
            ));
            cursor += dur;
        }
        out
    }

    fn uniform_timestamps(count: u64) -> Vec<WordTimestamp> {
        (0..count)
            .map(|i| WordTimestamp::new(format!("w{i}"), i * 300, (i + 1) * 300, false))
            .collect()
    }

    #[test]
    fn test_good_video_passes() {
        let s = script(
            "Most people think coffee wakes you, but it blocks adenosine",
            "The truth is your receptors adapt fast",
            "Now watch your own habits",
        );
        let stamps = varied_timestamps();
        let verdict = audit(&AuditInput {
            script: &s,
            timestamps: &stamps,
        });
        assert!(verdict.go, "reasons: {:?}", verdict.reasons);
    }

    #[test]
    fn test_polite_ending_is_nogo() {
        let s = script(
            "Most people think coffee wakes you, but it blocks adenosine",
            "The truth is your receptors adapt fast",
            "Thank you for watching",
        );
        let stamps = varied_timestamps();
        let verdict = audit(&AuditInput {
            script: &s,
            timestamps: &stamps,
        });
        assert!(!verdict.go);
        assert!(verdict.reasons.iter().any(
            |r| r == "Video feels complete/polite instead of intentionally unfinished"
        ));
    }

    #[test]
    fn test_skippable_hook_is_nogo() {
        let s = script(
            "Coffee is a popular morning drink",
            "The truth is your receptors adapt fast",
            "Now watch your own habits",
        );
        let stamps = varied_timestamps();
        let verdict = audit(&AuditInput {
            script: &s,
            timestamps: &stamps,
        });
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r == "First 2 seconds feel skippable"));
    }

    #[test]
    fn test_neutral_stance_is_nogo() {
        let s = script(
            "Nobody tells you this about coffee",
            "Coffee is made from roasted beans",
            "Go taste some beans",
        );
        let stamps = varied_timestamps();
        let verdict = audit(&AuditInput {
            script: &s,
            timestamps: &stamps,
        });
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r == "Video feels neutral and safe"));
    }

    #[test]
    fn test_uniform_pacing_is_nogo() {
        let s = script(
            "Most people think coffee wakes you, but it blocks adenosine",
            "The truth is your receptors adapt fast",
            "Now watch your own habits",
        );
        // 30 identical words: every window paces at 3.33 wps
        let stamps = uniform_timestamps(30);
        let verdict = audit(&AuditInput {
            script: &s,
            timestamps: &stamps,
        });
        assert!(verdict.reasons.iter().any(|r| r == "Pacing feels uniform"));
    }

    #[test]
    fn test_uniform_run_measurement() {
        // 10 words: two windows, one uniform pair -> 1.5s, under budget
        assert!(uniform_pacing_secs(&uniform_timestamps(10)) < PACING_BUDGET_SECS);
        // 30 words: five uniform pairs -> 6s, over budget
        assert!(uniform_pacing_secs(&uniform_timestamps(30)) > PACING_BUDGET_SECS);
    }
}
