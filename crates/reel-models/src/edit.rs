//! Edit plan segments.

use serde::{Deserialize, Serialize};

use crate::visual::{Pan, Zoom};

/// Why a segment exists in the edit plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentReason {
    /// Plain caption-aligned cut
    Cut,
    /// Isolated emphasized word (carries the 1.05 zoom)
    Emphasis,
    /// Forced pan to break viewer habituation
    PatternInterrupt,
}

/// Reference from an edit segment to its caption, or to a synthetic
/// silence filler when no caption covers the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptionRef {
    /// Index into the scene's caption list
    Index(usize),
    /// Synthetic filler id of the form `silence_<k>`
    Silence(String),
}

impl CaptionRef {
    /// Build the k-th silence filler reference.
    pub fn silence(k: u32) -> Self {
        CaptionRef::Silence(format!("silence_{k}"))
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, CaptionRef::Silence(_))
    }
}

/// One segment of the edit plan.
///
/// Segments tile the scene timeline; each points at the visual clip
/// covering its start instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    /// The visual clip whose span contains `start_ms`
    pub clip_id: String,
    /// `Subtle` only when `reason` is `Emphasis`
    pub zoom: Zoom,
    pub pan: Pan,
    pub caption: CaptionRef,
    pub reason: SegmentReason,
}

impl EditSegment {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether this segment overlaps the half-open window `[from, to)`.
    pub fn intersects(&self, from_ms: u64, to_ms: u64) -> bool {
        self.start_ms < to_ms && self.end_ms > from_ms
    }
}
