//! Visual clips and their zoom/pan transforms.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Zoom level applied when normalizing a clip to the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Zoom {
    /// No zoom (factor 1.0)
    #[default]
    None,
    /// Subtle push (factor 1.05); the only zoom an edit segment may carry
    Subtle,
    /// Strong push (factor 1.10); visual-timeline transforms only
    Strong,
}

impl Zoom {
    /// Scale factor applied to the normalization filter chain.
    pub fn factor(&self) -> f64 {
        match self {
            Zoom::None => 1.0,
            Zoom::Subtle => 1.05,
            Zoom::Strong => 1.10,
        }
    }
}

/// Pan direction: which edge of the oversized frame the crop anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pan {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl Pan {
    /// Canonical ordering; index 0 is `None`, the pattern-interrupt
    /// formula indexes into 1..=4.
    pub const ALL: [Pan; 5] = [Pan::None, Pan::Left, Pan::Right, Pan::Up, Pan::Down];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pan::None => "none",
            Pan::Left => "left",
            Pan::Right => "right",
            Pan::Up => "up",
            Pan::Down => "down",
        }
    }
}

/// Zoom/pan pair assigned to a clip or edit segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClipTransform {
    pub zoom: Zoom,
    pub pan: Pan,
}

/// One stock clip placed on the scene's visual timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualClip {
    /// Globally unique within the process (provider id + serial)
    pub clip_id: String,
    /// Provider that supplied the asset ("pexels", "mock", ...)
    pub provider: String,
    /// Local file backing this clip
    pub local_path: PathBuf,
    pub start_ms: u64,
    pub end_ms: u64,
    /// The search keyword this clip was selected for
    pub keyword: String,
    pub transform: ClipTransform,
    /// Set when supply shortage forced the timeline to repeat an asset
    #[serde(default)]
    pub reused: bool,
}

impl VisualClip {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether this clip's span contains the given instant.
    pub fn covers(&self, at_ms: u64) -> bool {
        self.start_ms <= at_ms && at_ms < self.end_ms
    }
}
