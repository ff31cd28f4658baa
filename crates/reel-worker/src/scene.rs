//! Per-scene sub-pipeline.
//!
//! Each scene runs its stages strictly in order: narration audio,
//! advisory gates, visual timeline (with one retry), captions, edit
//! plan, segment render. The outcome carries everything the final
//! auditor needs, so scenes stay side-effect free beyond their own
//! files.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use reel_models::{AudioResult, Caption, EditSegment, Pacing, Scene, VisualClip};
use reel_timeline::{
    build_edit_plan, group_captions, validate_captions, validate_edit_plan, validate_keywords,
    validate_timing, SceneTiming,
};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};
use crate::visual_timeline::VisualTimelineBuilder;

/// Everything one scene contributes to the job.
pub struct SceneOutcome {
    pub index: usize,
    /// Rendered segment awaiting concatenation
    pub segment_path: PathBuf,
    pub audio: AudioResult,
    pub clips: Vec<VisualClip>,
    pub captions: Vec<Caption>,
    pub edit_plan: Vec<EditSegment>,
}

/// Drive one scene through its stages.
pub async fn process_scene(
    ctx: &WorkerContext,
    job_id: &str,
    target_seconds: u32,
    index: usize,
    scene: &Scene,
    timing: &SceneTiming,
) -> WorkerResult<SceneOutcome> {
    debug!(job_id, scene = index, "Scene processing started");

    // Narration audio; the timing model stays authoritative
    let audio_dir = ctx.config.audio_dir();
    tokio::fs::create_dir_all(&audio_dir).await?;
    let audio_base = audio_dir.join(format!("{job_id}_scene_{index}"));
    let audio_path = ctx
        .tts
        .synthesize(&scene.text, timing.duration_ms, &audio_base)
        .await
        .map_err(|e| WorkerError::Internal(format!("Speech synthesis failed: {e}")))?;
    let audio = AudioResult {
        audio_path,
        timestamps: timing.timestamps.clone(),
        duration_ms: timing.duration_ms,
        pacing: Pacing::default(),
    };

    // Advisory gates: log, never fail
    let keyword_report = validate_keywords(&scene.keywords);
    if !keyword_report.is_valid() {
        warn!(job_id, scene = index, "Keyword gate: {}", keyword_report.summary());
    }
    let pacing_report = validate_timing(&audio.timestamps, audio.duration_ms, target_seconds);
    if !pacing_report.is_valid() {
        warn!(job_id, scene = index, "Pacing gate: {}", pacing_report.summary());
    }

    // Visual timeline, one retry on gate rejection
    let mut builder = VisualTimelineBuilder::new(
        Arc::clone(&ctx.cache),
        Arc::clone(&ctx.stock),
        Arc::clone(&ctx.downloader),
    );
    let mut clips = None;
    for attempt in 1..=ctx.config.visual_attempts {
        match builder.build(job_id, &scene.keywords, timing.duration_ms).await {
            Ok(timeline) => {
                clips = Some(timeline);
                break;
            }
            Err(e) if attempt < ctx.config.visual_attempts => {
                warn!(job_id, scene = index, "Visual timeline attempt {attempt} failed: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    let clips = clips.ok_or_else(|| WorkerError::Internal("Visual attempts exhausted".into()))?;

    // Captions
    let captions = group_captions(&audio.timestamps);
    let caption_report = validate_captions(&captions, audio.duration_ms);
    if !caption_report.is_valid() {
        return Err(WorkerError::GateReject {
            stage: "caption",
            errors: caption_report.errors,
        });
    }

    // Edit plan
    let edit_plan = build_edit_plan(&audio.timestamps, audio.duration_ms, &captions, &clips)?;
    let edit_report = validate_edit_plan(&edit_plan, audio.duration_ms);
    if !edit_report.is_valid() {
        return Err(WorkerError::GateReject {
            stage: "edit",
            errors: edit_report.errors,
        });
    }

    // Render the segment
    let work_dir = ctx
        .config
        .temp_render_dir()
        .join(format!("{job_id}_scene_{index}"));
    let segment_dir = ctx.config.temp_output_dir();
    tokio::fs::create_dir_all(&segment_dir).await?;
    let segment_path = segment_dir.join(format!("{job_id}_scene_{index}.mp4"));

    ctx.renderer
        .render_scene(
            reel_media::RenderSpec {
                segments: &edit_plan,
                clips: &clips,
                captions: &captions,
                audio_path: &audio.audio_path,
                duration_ms: audio.duration_ms,
            },
            &work_dir,
            &segment_path,
        )
        .await
        .map_err(WorkerError::render)?;

    info!(job_id, scene = index, "Scene rendered to {}", segment_path.display());

    Ok(SceneOutcome {
        index,
        segment_path,
        audio,
        clips,
        captions,
        edit_plan,
    })
}
