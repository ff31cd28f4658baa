//! Vertical reel filter graph construction.
//!
//! Every clip is normalized to 1080x1920@30 with its zoom/pan
//! applied, trimmed to its segment, concatenated, and captioned with
//! drawtext overlays enabled on the segment timeline.

use reel_models::{Caption, EditSegment, Pan, VisualClip, Zoom};

use crate::error::{MediaError, MediaResult};

/// Output frame width.
pub const OUTPUT_WIDTH: u32 = 1080;

/// Output frame height.
pub const OUTPUT_HEIGHT: u32 = 1920;

/// Output frame rate.
pub const OUTPUT_FPS: u32 = 30;

/// Caption baseline offset from the bottom edge.
const CAPTION_BOTTOM_MARGIN: u32 = 60;

/// Scaled dimension for a zoom factor, rounded to an even pixel count.
fn scaled_dim(base: u32, zoom: f64) -> u32 {
    let scaled = (base as f64 * zoom / 2.0).round() as u32;
    scaled * 2
}

/// Crop offset expressions for a pan direction.
fn pan_offsets(pan: Pan) -> (String, String) {
    let center_x = format!("(iw-{OUTPUT_WIDTH})/2");
    let center_y = format!("(ih-{OUTPUT_HEIGHT})/2");
    match pan {
        Pan::None => (center_x, center_y),
        Pan::Left => ("0".to_string(), center_y),
        Pan::Right => (format!("iw-{OUTPUT_WIDTH}"), center_y),
        Pan::Up => (center_x, "0".to_string()),
        Pan::Down => (center_x, format!("ih-{OUTPUT_HEIGHT}")),
    }
}

/// Normalization chain for one segment's clip: scale with zoom, crop
/// with pan anchor, fps/pixel-format normalize, trim, reset PTS.
fn normalize_chain(input_index: usize, zoom: Zoom, pan: Pan, trim_ms: u64, label: &str) -> String {
    let scale_w = scaled_dim(OUTPUT_WIDTH, zoom.factor());
    let scale_h = scaled_dim(OUTPUT_HEIGHT, zoom.factor());
    let (x, y) = pan_offsets(pan);
    let trim_secs = trim_ms as f64 / 1000.0;
    format!(
        "[{input_index}:v]scale={scale_w}:{scale_h}:force_original_aspect_ratio=increase,\
         crop={OUTPUT_WIDTH}:{OUTPUT_HEIGHT}:{x}:{y},\
         fps={OUTPUT_FPS},format=yuv420p,\
         trim=duration={trim_secs:.3},setpts=PTS-STARTPTS[{label}]"
    )
}

/// Escape text for a drawtext filter argument.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            ':' => out.push_str("\\:"),
            '%' => out.push_str("\\%"),
            _ => out.push(c),
        }
    }
    out
}

/// Drawtext overlay for one caption: centered, pinned above the
/// bottom margin, enabled only over the caption's span. Emphasis
/// captions render gold and slightly larger.
fn drawtext_filter(caption: &Caption) -> String {
    let (color, size) = if caption.has_emphasis() {
        let scaled = (caption.style.font_size as f64 * caption.style.emphasis_scale).round() as u32;
        (caption.style.emphasis_color.as_str(), scaled)
    } else {
        (caption.style.color.as_str(), caption.style.font_size)
    };
    let (shadow_x, shadow_y) = caption.style.shadow_offset;
    let start = caption.start_ms as f64 / 1000.0;
    let end = caption.end_ms as f64 / 1000.0;
    format!(
        "drawtext=text='{}':fontsize={size}:fontcolor={color}:\
         shadowcolor=black:shadowx={shadow_x}:shadowy={shadow_y}:\
         x=(w-text_w)/2:y=h-text_h-{CAPTION_BOTTOM_MARGIN}:\
         enable='between(t,{start:.3},{end:.3})'",
        escape_drawtext(&caption.text)
    )
}

/// Effective transform for a segment: the edit plan's zoom/pan when
/// set, the clip's baseline transform otherwise.
fn effective_transform(segment: &EditSegment, clip: &VisualClip) -> (Zoom, Pan) {
    let zoom = if segment.zoom == Zoom::None {
        clip.transform.zoom
    } else {
        segment.zoom
    };
    let pan = if segment.pan == Pan::None {
        clip.transform.pan
    } else {
        segment.pan
    };
    (zoom, pan)
}

/// Build the full filter graph for one scene.
///
/// Inputs 0..N-1 are the segments' clips in plan order; the caller
/// passes the matching files in the same order. The captioned result
/// lands in `[video_out]`.
pub fn build_scene_graph(
    segments: &[EditSegment],
    clips: &[VisualClip],
    captions: &[Caption],
) -> MediaResult<String> {
    let mut lines = Vec::with_capacity(segments.len() + 2);

    for (index, segment) in segments.iter().enumerate() {
        let clip = find_clip(clips, &segment.clip_id)?;
        let (zoom, pan) = effective_transform(segment, clip);
        lines.push(normalize_chain(
            index,
            zoom,
            pan,
            segment.duration_ms(),
            &format!("s{index}"),
        ));
    }

    let inputs: String = (0..segments.len()).map(|i| format!("[s{i}]")).collect();
    lines.push(format!(
        "{inputs}concat=n={}:v=1:a=0[cat]",
        segments.len()
    ));

    if captions.is_empty() {
        lines.push("[cat]null[video_out]".to_string());
    } else {
        let overlays: Vec<String> = captions.iter().map(drawtext_filter).collect();
        lines.push(format!("[cat]{}[video_out]", overlays.join(",")));
    }

    Ok(lines.join(";\n"))
}

/// Ordered input files for [`build_scene_graph`], one per segment.
pub fn graph_inputs<'a>(
    segments: &[EditSegment],
    clips: &'a [VisualClip],
) -> MediaResult<Vec<&'a std::path::Path>> {
    segments
        .iter()
        .map(|segment| Ok(find_clip(clips, &segment.clip_id)?.local_path.as_path()))
        .collect()
}

fn find_clip<'a>(clips: &'a [VisualClip], clip_id: &str) -> MediaResult<&'a VisualClip> {
    clips.iter().find(|c| c.clip_id == clip_id).ok_or_else(|| {
        MediaError::Internal(format!(
            "Edit plan references clip {clip_id} missing from the timeline"
        ))
    })
}
