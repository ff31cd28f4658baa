//! Visual pacing math and the visual timeline gate.
//!
//! The random parts of the visual timeline (clip length draws,
//! transform rolls) live in the worker; the math that constrains them
//! lives here so it can be tested exhaustively.

use std::collections::HashSet;

use reel_models::VisualClip;

use crate::gate::GateReport;

/// Shortest clip the timeline may schedule.
pub const MIN_CLIP_MS: u64 = 800;

/// Longest clip the timeline may schedule.
pub const MAX_CLIP_MS: u64 = 3000;

/// Allowed gap or overlap between adjacent clips.
pub const CLIP_TOLERANCE_MS: u64 = 20;

/// Allowed shortfall at the end of the timeline.
pub const TAIL_TOLERANCE_MS: u64 = 200;

/// Lower bound on clip length so the available supply can still cover
/// the full duration.
pub fn min_clip_duration_ms(duration_ms: u64, unique_available: usize) -> u64 {
    let per_clip = duration_ms.div_ceil(unique_available.max(1) as u64);
    per_clip.clamp(MIN_CLIP_MS, MAX_CLIP_MS)
}

/// Whether the asset supply is too small to cover the duration without
/// repeating clips.
pub fn reuse_required(duration_ms: u64, unique_available: usize) -> bool {
    (unique_available as u64) * MAX_CLIP_MS < duration_ms
}

/// Adjust a drawn clip length so the remaining time never becomes an
/// unformable sliver shorter than [`MIN_CLIP_MS`].
///
/// Returns the final length for this clip.
pub fn fit_clip_duration(remaining_ms: u64, picked_ms: u64) -> u64 {
    if picked_ms >= remaining_ms {
        return remaining_ms;
    }
    let leftover = remaining_ms - picked_ms;
    if leftover < MIN_CLIP_MS {
        if remaining_ms <= MAX_CLIP_MS {
            // Absorb the sliver into this clip
            remaining_ms
        } else {
            // Shrink so the next clip is exactly the minimum
            remaining_ms - MIN_CLIP_MS
        }
    } else {
        picked_ms
    }
}

/// Visual timeline gate: coverage, clip bounds, id uniqueness.
pub fn validate_visual_timeline(
    clips: &[VisualClip],
    duration_ms: u64,
    allow_reuse: bool,
) -> GateReport {
    let mut report = GateReport::new();

    if clips.is_empty() {
        report.push("Visual timeline is empty".to_string());
        return report;
    }

    if clips[0].start_ms > CLIP_TOLERANCE_MS {
        report.push(format!(
            "Timeline starts at {}ms instead of 0",
            clips[0].start_ms
        ));
    }

    for (index, clip) in clips.iter().enumerate() {
        let span = clip.duration_ms();
        if !(MIN_CLIP_MS..=MAX_CLIP_MS).contains(&span) {
            report.push(format!(
                "Clip {index} ({}) runs {span}ms, outside {MIN_CLIP_MS}-{MAX_CLIP_MS}ms",
                clip.clip_id
            ));
        }
    }

    for (index, pair) in clips.windows(2).enumerate() {
        let prev_end = pair[0].end_ms;
        let next_start = pair[1].start_ms;
        let drift = prev_end.abs_diff(next_start);
        if drift > CLIP_TOLERANCE_MS {
            report.push(format!(
                "Clips {index} and {} drift {drift}ms apart at {prev_end}ms",
                index + 1
            ));
        }
    }

    let last_end = clips.last().unwrap().end_ms;
    if last_end.abs_diff(duration_ms) > TAIL_TOLERANCE_MS {
        report.push(format!(
            "Timeline ends at {last_end}ms, expected {duration_ms}ms"
        ));
    }

    let mut seen = HashSet::new();
    for clip in clips {
        if !seen.insert(clip.clip_id.as_str()) && !(allow_reuse && clip.reused) {
            report.push(format!("Clip id {} appears twice", clip.clip_id));
        }
    }

    report
}
