//! Edit plan construction and its gate.
//!
//! The plan starts from the caption timeline, isolates emphasized
//! words into their own cuts, fills uncaptioned spans with silence
//! segments, binds every segment to the visual clip under its start,
//! and forces a pan change in every 2500ms window so the eye never
//! settles.

use reel_models::{Caption, CaptionRef, EditSegment, Pan, SegmentReason, VisualClip, WordTimestamp, Zoom};
use thiserror::Error;

use crate::gate::GateReport;
use crate::pacing::{CLIP_TOLERANCE_MS, TAIL_TOLERANCE_MS};

/// Longest allowed edit segment.
pub const MAX_SEGMENT_MS: u64 = 3000;

/// Width of the habituation window; each must contain an interrupt.
pub const INTERRUPT_WINDOW_MS: u64 = 2500;

#[derive(Debug, Error)]
pub enum EditPlanError {
    /// A segment starts where no visual clip exists.
    #[error("No visual clip covers {at_ms}ms")]
    NoVisualCoverage { at_ms: u64 },

    /// A habituation window holds only emphasis segments, so no pan
    /// interrupt can be placed.
    #[error("No pattern-interrupt candidate in window starting at {window_start_ms}ms")]
    InterruptUnsatisfiable { window_start_ms: u64 },
}

/// Working segment before visuals and transforms are bound.
#[derive(Debug, Clone)]
struct Draft {
    start_ms: u64,
    end_ms: u64,
    caption: CaptionRef,
    /// True for a segment isolating a single emphasized word
    emphasis_word: bool,
}

/// Build the edit plan for one scene.
pub fn build_edit_plan(
    words: &[WordTimestamp],
    duration_ms: u64,
    captions: &[Caption],
    visuals: &[VisualClip],
) -> Result<Vec<EditSegment>, EditPlanError> {
    // 1. One draft per caption
    let mut drafts: Vec<Draft> = captions
        .iter()
        .enumerate()
        .map(|(index, caption)| Draft {
            start_ms: caption.start_ms,
            end_ms: caption.end_ms,
            caption: CaptionRef::Index(index),
            emphasis_word: false,
        })
        .collect();

    // 2. Split anything over the segment cap at word boundaries
    drafts = split_long_drafts(drafts, words);

    // 3. Isolate emphasized words into their own drafts
    drafts = isolate_emphasis(drafts, words);

    // 4. Fill gaps and the tail with silence drafts
    drafts.sort_by_key(|d| d.start_ms);
    let drafts = fill_silence(drafts, duration_ms);

    // 5-6. Bind visuals and assign emphasis transforms
    let mut segments = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let clip = clip_covering(visuals, draft.start_ms)
            .ok_or(EditPlanError::NoVisualCoverage {
                at_ms: draft.start_ms,
            })?;
        let emphasis = draft.emphasis_word
            || matches!(draft.caption, CaptionRef::Index(i) if captions[i].has_emphasis());
        segments.push(EditSegment {
            start_ms: draft.start_ms,
            end_ms: draft.end_ms,
            clip_id: clip.clip_id.clone(),
            zoom: if emphasis { Zoom::Subtle } else { Zoom::None },
            pan: Pan::None,
            caption: draft.caption.clone(),
            reason: if emphasis {
                SegmentReason::Emphasis
            } else {
                SegmentReason::Cut
            },
        });
    }

    // 7. Place a pan interrupt in every habituation window
    place_interrupts(&mut segments, duration_ms)?;

    Ok(segments)
}

fn split_long_drafts(drafts: Vec<Draft>, words: &[WordTimestamp]) -> Vec<Draft> {
    let mut out = Vec::with_capacity(drafts.len());
    for mut draft in drafts {
        while draft.end_ms - draft.start_ms > MAX_SEGMENT_MS {
            // Latest word boundary that keeps the head under the cap
            let boundary = words
                .iter()
                .map(|w| w.end_ms)
                .filter(|&b| b > draft.start_ms && b < draft.end_ms)
                .filter(|&b| b - draft.start_ms <= MAX_SEGMENT_MS)
                .max();
            let Some(boundary) = boundary else {
                break;
            };
            out.push(Draft {
                start_ms: draft.start_ms,
                end_ms: boundary,
                caption: draft.caption.clone(),
                emphasis_word: false,
            });
            draft.start_ms = boundary;
        }
        out.push(draft);
    }
    out
}

fn isolate_emphasis(drafts: Vec<Draft>, words: &[WordTimestamp]) -> Vec<Draft> {
    let mut out = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let emphasized: Vec<&WordTimestamp> = words
            .iter()
            .filter(|w| w.emphasis && w.start_ms >= draft.start_ms && w.end_ms <= draft.end_ms)
            .collect();
        if emphasized.is_empty() {
            out.push(draft);
            continue;
        }

        let mut span_start = draft.start_ms;
        for word in emphasized {
            if word.start_ms > span_start {
                out.push(Draft {
                    start_ms: span_start,
                    end_ms: word.start_ms,
                    caption: draft.caption.clone(),
                    emphasis_word: false,
                });
            }
            out.push(Draft {
                start_ms: word.start_ms,
                end_ms: word.end_ms,
                caption: draft.caption.clone(),
                emphasis_word: true,
            });
            span_start = word.end_ms;
        }
        if span_start < draft.end_ms {
            out.push(Draft {
                start_ms: span_start,
                end_ms: draft.end_ms,
                caption: draft.caption.clone(),
                emphasis_word: false,
            });
        }
    }
    out
}

fn fill_silence(drafts: Vec<Draft>, duration_ms: u64) -> Vec<Draft> {
    let mut out = Vec::with_capacity(drafts.len());
    let mut cursor = 0u64;
    let mut silence_k = 0u32;

    let mut fill = |from: u64, to: u64, out: &mut Vec<Draft>, silence_k: &mut u32| {
        let mut at = from;
        while at < to {
            let take = (to - at).min(MAX_SEGMENT_MS);
            out.push(Draft {
                start_ms: at,
                end_ms: at + take,
                caption: CaptionRef::silence(*silence_k),
                emphasis_word: false,
            });
            *silence_k += 1;
            at += take;
        }
    };

    for draft in drafts {
        if draft.start_ms > cursor + CLIP_TOLERANCE_MS {
            fill(cursor, draft.start_ms, &mut out, &mut silence_k);
        }
        cursor = cursor.max(draft.end_ms);
        out.push(draft);
    }
    if duration_ms > cursor + CLIP_TOLERANCE_MS {
        fill(cursor, duration_ms, &mut out, &mut silence_k);
    }

    out
}

/// Find the clip whose span contains the instant. A start landing in
/// the tolerated shortfall right after the last clip binds to it.
fn clip_covering(visuals: &[VisualClip], at_ms: u64) -> Option<&VisualClip> {
    if let Some(clip) = visuals.iter().find(|c| c.covers(at_ms)) {
        return Some(clip);
    }
    let last = visuals.last()?;
    if at_ms >= last.end_ms && at_ms - last.end_ms <= TAIL_TOLERANCE_MS {
        return Some(last);
    }
    None
}

/// Deterministic interrupt pan: hash the clip id into the non-`None`
/// pan directions.
fn interrupt_pan(clip_id: &str) -> Pan {
    let sum: u64 = clip_id.chars().map(|c| c as u64).sum();
    let index = (sum % (Pan::ALL.len() as u64 - 1)) as usize + 1;
    Pan::ALL[index]
}

fn place_interrupts(
    segments: &mut [EditSegment],
    duration_ms: u64,
) -> Result<(), EditPlanError> {
    let mut window_start = 0u64;
    while window_start < duration_ms {
        let window_end = (window_start + INTERRUPT_WINDOW_MS).min(duration_ms);
        let candidate = segments
            .iter_mut()
            .filter(|s| s.reason != SegmentReason::Emphasis)
            .find(|s| s.intersects(window_start, window_end));
        match candidate {
            Some(segment) => {
                segment.pan = interrupt_pan(&segment.clip_id);
                segment.reason = SegmentReason::PatternInterrupt;
            }
            None => {
                return Err(EditPlanError::InterruptUnsatisfiable {
                    window_start_ms: window_start,
                });
            }
        }
        window_start += INTERRUPT_WINDOW_MS;
    }
    Ok(())
}

/// Edit plan gate: coverage, segment cap, zoom discipline, interrupts.
pub fn validate_edit_plan(segments: &[EditSegment], duration_ms: u64) -> GateReport {
    let mut report = GateReport::new();

    if segments.is_empty() {
        report.push("Edit plan is empty".to_string());
        return report;
    }

    if segments[0].start_ms > CLIP_TOLERANCE_MS {
        report.push(format!(
            "Plan starts at {}ms instead of 0",
            segments[0].start_ms
        ));
    }

    for (index, pair) in segments.windows(2).enumerate() {
        let drift = pair[0].end_ms.abs_diff(pair[1].start_ms);
        if drift > CLIP_TOLERANCE_MS {
            report.push(format!(
                "Segments {index} and {} drift {drift}ms apart",
                index + 1
            ));
        }
    }

    let last_end = segments.last().unwrap().end_ms;
    if last_end.abs_diff(duration_ms) > TAIL_TOLERANCE_MS {
        report.push(format!(
            "Plan ends at {last_end}ms, expected {duration_ms}ms"
        ));
    }

    for (index, segment) in segments.iter().enumerate() {
        if segment.duration_ms() > MAX_SEGMENT_MS {
            report.push(format!(
                "Segment {index} runs {}ms, max is {MAX_SEGMENT_MS}ms",
                segment.duration_ms()
            ));
        }
        match segment.zoom {
            Zoom::None => {}
            Zoom::Subtle => {
                if segment.reason != SegmentReason::Emphasis {
                    report.push(format!(
                        "Segment {index} zooms without an emphasis reason"
                    ));
                }
            }
            Zoom::Strong => {
                report.push(format!("Segment {index} carries a strong zoom"));
            }
        }
    }

    let mut window_start = 0u64;
    while window_start < duration_ms {
        let window_end = (window_start + INTERRUPT_WINDOW_MS).min(duration_ms);
        let has_interrupt = segments.iter().any(|s| {
            s.reason == SegmentReason::PatternInterrupt && s.intersects(window_start, window_end)
        });
        if !has_interrupt {
            report.push(format!(
                "No pattern interrupt in window {window_start}-{window_end}ms"
            ));
        }
        window_start += INTERRUPT_WINDOW_MS;
    }

    report
}
