//! Generated script structure: scenes, tones, keywords.

use serde::{Deserialize, Serialize};

/// Number of scenes every script must have: one hook, five body
/// scenes, one ending.
pub const SCENE_COUNT: usize = 7;

/// Narration tone requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Informative,
    Dramatic,
    Motivational,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Dramatic => "dramatic",
            Tone::Motivational => "motivational",
            Tone::Neutral => "neutral",
        }
    }

    /// Parse from the wire value. Returns `None` for unknown tones.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "informative" => Some(Tone::Informative),
            "dramatic" => Some(Tone::Dramatic),
            "motivational" => Some(Tone::Motivational),
            "neutral" => Some(Tone::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a scene within the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Hook,
    #[serde(rename = "body_1")]
    Body1,
    #[serde(rename = "body_2")]
    Body2,
    #[serde(rename = "body_3")]
    Body3,
    #[serde(rename = "body_4")]
    Body4,
    #[serde(rename = "body_5")]
    Body5,
    Ending,
}

impl SceneKind {
    /// All kinds in script order.
    pub const ORDERED: [SceneKind; SCENE_COUNT] = [
        SceneKind::Hook,
        SceneKind::Body1,
        SceneKind::Body2,
        SceneKind::Body3,
        SceneKind::Body4,
        SceneKind::Body5,
        SceneKind::Ending,
    ];

    pub fn is_hook(&self) -> bool {
        matches!(self, SceneKind::Hook)
    }

    pub fn is_ending(&self) -> bool {
        matches!(self, SceneKind::Ending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::Hook => "hook",
            SceneKind::Body1 => "body_1",
            SceneKind::Body2 => "body_2",
            SceneKind::Body3 => "body_3",
            SceneKind::Body4 => "body_4",
            SceneKind::Body5 => "body_5",
            SceneKind::Ending => "ending",
        }
    }
}

/// One scene of the generated script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Position within the script
    #[serde(rename = "type")]
    pub kind: SceneKind,
    /// Narration text
    pub text: String,
    /// 2-3 concrete lower-case search keywords for stock footage
    pub keywords: Vec<String>,
}

impl Scene {
    pub fn new(kind: SceneKind, text: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            keywords,
        }
    }

    /// Word count of the narration text.
    pub fn word_count(&self) -> usize {
        count_words(&self.text)
    }
}

/// A complete generated script: exactly [`SCENE_COUNT`] ordered scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub scenes: Vec<Scene>,
}

impl Script {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    /// The opening scene text. Empty string if the script is malformed.
    pub fn hook(&self) -> &str {
        self.scenes.first().map(|s| s.text.as_str()).unwrap_or("")
    }

    /// The final scene text. Empty string if the script is malformed.
    pub fn ending(&self) -> &str {
        self.scenes.last().map(|s| s.text.as_str()).unwrap_or("")
    }

    /// All narration text joined, used by aggregate heuristics.
    pub fn full_text(&self) -> String {
        self.scenes
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whitespace word count.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&SceneKind::Body3).unwrap(),
            "\"body_3\""
        );
        assert_eq!(serde_json::to_string(&SceneKind::Hook).unwrap(), "\"hook\"");
        let kind: SceneKind = serde_json::from_str("\"body_1\"").unwrap();
        assert_eq!(kind, SceneKind::Body1);
    }

    #[test]
    fn test_script_accessors() {
        let scenes = SceneKind::ORDERED
            .iter()
            .map(|k| Scene::new(*k, format!("text for {}", k.as_str()), vec!["cat".into(), "dog".into()]))
            .collect();
        let script = Script::new(scenes);
        assert_eq!(script.hook(), "text for hook");
        assert_eq!(script.ending(), "text for ending");
        assert_eq!(script.scenes.len(), SCENE_COUNT);
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!(Tone::parse("dramatic"), Some(Tone::Dramatic));
        assert_eq!(Tone::parse("sarcastic"), None);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Most people think coffee wakes you"), 6);
        assert_eq!(count_words("  "), 0);
    }
}
