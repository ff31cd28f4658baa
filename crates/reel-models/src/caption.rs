//! Caption segments and their static styling.

use serde::{Deserialize, Serialize};

/// Static caption rendering parameters.
///
/// One style is shared by every caption; emphasis captions derive
/// their look from the same parameters (gold fill, scaled size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Base font size in pixels at 1080x1920
    pub font_size: u32,
    /// Fill color for regular captions
    pub color: String,
    /// Fill color when the caption carries an emphasized word
    pub emphasis_color: String,
    /// Font size multiplier for emphasis captions
    pub emphasis_scale: f64,
    /// Shadow offset in pixels (x, y)
    pub shadow_offset: (i32, i32),
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 64,
            color: "white".to_string(),
            emphasis_color: "gold".to_string(),
            emphasis_scale: 1.1,
            shadow_offset: (2, 2),
        }
    }
}

/// A caption: 1-3 words shown together on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// 1-3 words joined by single spaces
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Positions (0-based, within this caption) of emphasized words
    pub emphasis_indices: Vec<usize>,
    pub style: CaptionStyle,
}

impl Caption {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether any word in this caption is emphasized.
    pub fn has_emphasis(&self) -> bool {
        !self.emphasis_indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_helpers() {
        let c = Caption {
            text: "a b c".to_string(),
            start_ms: 0,
            end_ms: 900,
            emphasis_indices: vec![1],
            style: CaptionStyle::default(),
        };
        assert_eq!(c.duration_ms(), 900);
        assert_eq!(c.word_count(), 3);
        assert!(c.has_emphasis());
    }
}
