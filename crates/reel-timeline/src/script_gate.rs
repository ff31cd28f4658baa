//! Structural validation of generated scripts.
//!
//! A script passes when the hook is short and curiosity-driven, the
//! ending is abrupt, and the scene list matches the expected shape.
//! Rejection feeds the regeneration loop; three rejections fail the
//! job.

use once_cell::sync::Lazy;
use regex::Regex;

use reel_models::{count_words, SceneKind, Script, SCENE_COUNT};

use crate::gate::GateReport;

/// Maximum words allowed in the hook.
pub const MAX_HOOK_WORDS: usize = 12;

/// Maximum words allowed in the ending.
pub const MAX_ENDING_WORDS: usize = 8;

/// Phrases that mark a hook as generic filler (case-insensitive).
pub const BANNED_HOOK_PHRASES: [&str; 4] = [
    "did you know",
    "in this video",
    "let's talk about",
    "you won't believe",
];

/// Curiosity hook shapes. A hook must match at least one.
static CURIOSITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "most people think X, but Y"
        Regex::new(r"(?i)\b(most|many|some)\s+(people|thinkers|experts)\s+think\b.*,\s*but\b")
            .unwrap(),
        // "nobody tells you this about X"
        Regex::new(r"(?i)\bnobody\s+(tells|told|is telling)\s+you\s+this\s+about\b").unwrap(),
        // "this sounds wrong, but X"
        Regex::new(r"(?i)\bthis\s+sounds\s+wrong,\s*but\b").unwrap(),
        // "X isn't the problem. Y is."
        Regex::new(r"(?i)\b(isn't|is not)\s+the\s+problem\..*\bis\.").unwrap(),
    ]
});

/// Whether the text matches any of the curiosity hook shapes.
pub fn matches_curiosity_pattern(text: &str) -> bool {
    CURIOSITY_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Find the first banned phrase contained in the hook, if any.
fn banned_phrase(hook: &str) -> Option<&'static str> {
    let lowered = hook.to_lowercase();
    BANNED_HOOK_PHRASES
        .iter()
        .find(|phrase| lowered.contains(*phrase))
        .copied()
}

/// Validate the structure of a generated script.
pub fn validate_script(script: &Script) -> GateReport {
    let mut report = GateReport::new();

    if script.scenes.len() != SCENE_COUNT {
        report.push(format!(
            "Expected {} scenes, got {}",
            SCENE_COUNT,
            script.scenes.len()
        ));
        return report;
    }

    for (scene, expected) in script.scenes.iter().zip(SceneKind::ORDERED) {
        if scene.kind != expected {
            report.push(format!(
                "Scene out of order: expected {}, got {}",
                expected.as_str(),
                scene.kind.as_str()
            ));
        }
        if scene.text.trim().is_empty() {
            report.push(format!("Scene {} has empty text", scene.kind.as_str()));
        }
    }

    let hook = script.hook();
    let hook_words = count_words(hook);
    if hook_words > MAX_HOOK_WORDS {
        report.push(format!(
            "Hook is {} words, max is {}",
            hook_words, MAX_HOOK_WORDS
        ));
    }

    if let Some(phrase) = banned_phrase(hook) {
        report.push(format!("Hook contains banned phrase \"{phrase}\""));
    }

    if !matches_curiosity_pattern(hook) {
        report.push("Hook does not match any curiosity pattern".to_string());
    }

    let ending = script.ending();
    let ending_words = count_words(ending);
    if ending_words > MAX_ENDING_WORDS {
        report.push(format!(
            "Ending is {} words, max is {}",
            ending_words, MAX_ENDING_WORDS
        ));
    }

    report
}

/// Per-scene keyword shape check. Advisory: the scene processor logs
/// failures instead of rejecting.
pub fn validate_keywords(keywords: &[String]) -> GateReport {
    let mut report = GateReport::new();

    if keywords.len() < 2 || keywords.len() > 3 {
        report.push(format!("Expected 2-3 keywords, got {}", keywords.len()));
    }
    for keyword in keywords {
        if keyword.trim().is_empty() {
            report.push("Empty keyword".to_string());
        } else if keyword != &keyword.to_lowercase() {
            report.push(format!("Keyword \"{keyword}\" is not lower-case"));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::Scene;

    fn script_with_hook_and_ending(hook: &str, ending: &str) -> Script {
        let scenes = SceneKind::ORDERED
            .iter()
            .map(|kind| {
                let text = if kind.is_hook() {
                    hook.to_string()
                } else if kind.is_ending() {
                    ending.to_string()
                } else {
                    "Caffeine blocks adenosine receptors in the brain".to_string()
                };
                Scene::new(*kind, text, vec!["coffee".into(), "brain".into()])
            })
            .collect();
        Script::new(scenes)
    }

    #[test]
    fn test_banned_phrase_rejected() {
        let script = script_with_hook_and_ending(
            "In this video we explain coffee",
            "Try it tomorrow",
        );
        let report = validate_script(&script);
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("banned phrase") && e.contains("in this video")));
    }

    #[test]
    fn test_curiosity_hook_accepted() {
        let script = script_with_hook_and_ending(
            "Most people think coffee wakes you, but it blocks adenosine",
            "Now rethink your next cup",
        );
        let report = validate_script(&script);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_all_four_patterns_match() {
        assert!(matches_curiosity_pattern(
            "Many experts think sleep is passive, but it rewires you"
        ));
        assert!(matches_curiosity_pattern(
            "Nobody tells you this about compound interest"
        ));
        assert!(matches_curiosity_pattern("This sounds wrong, but cold helps"));
        assert!(matches_curiosity_pattern(
            "Talent isn't the problem. Discipline is."
        ));
    }

    #[test]
    fn test_long_hook_rejected() {
        let script = script_with_hook_and_ending(
            "Most people think that drinking lots of coffee late at night wakes you, but no",
            "Done",
        );
        let report = validate_script(&script);
        assert!(report.errors.iter().any(|e| e.contains("Hook is")));
    }

    #[test]
    fn test_long_ending_rejected() {
        let script = script_with_hook_and_ending(
            "Most people think coffee wakes you, but no",
            "And that is everything you need to know about it today",
        );
        let report = validate_script(&script);
        assert!(report.errors.iter().any(|e| e.contains("Ending is")));
    }

    #[test]
    fn test_wrong_scene_count() {
        let script = Script::new(vec![Scene::new(
            SceneKind::Hook,
            "Short",
            vec!["a".into(), "b".into()],
        )]);
        let report = validate_script(&script);
        assert!(report.errors.iter().any(|e| e.contains("Expected 7 scenes")));
    }

    #[test]
    fn test_keyword_gate() {
        assert!(validate_keywords(&["coffee".into(), "brain".into()]).is_valid());
        assert!(!validate_keywords(&["coffee".into()]).is_valid());
        assert!(!validate_keywords(&["Coffee".into(), "brain".into()]).is_valid());
    }
}
