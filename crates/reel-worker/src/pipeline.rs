//! Per-job pipeline driver.
//!
//! Sequencing: oracle script (with regeneration on gate rejection),
//! dry-run early exit, timing synthesis and the audio gate, parallel
//! scene processing, the concat barrier, the final audit, and result
//! publication. Scene tasks are structured under a `JoinSet`: the
//! first failure aborts the rest and fails the job.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use reel_models::{Job, JobResult, JobStatus, Script};
use reel_queue::ProgressReporter;
use reel_timeline::{
    audit, synthesize_script_timing, validate_script, validate_timing, AuditInput, ScriptTiming,
};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};
use crate::scene::{process_scene, SceneOutcome};

/// Run one job to completion. The caller owns publishing the result
/// or failure into the store.
pub async fn run_job(ctx: Arc<WorkerContext>, job: Job) -> WorkerResult<JobResult> {
    let reporter = ProgressReporter::new(Arc::clone(&ctx.store), job.id.clone());
    let job_id = job.id.to_string();

    reporter
        .stage(JobStatus::Processing, "Picked up by worker")
        .await;

    // Script generation with regeneration on gate rejection
    reporter
        .stage(JobStatus::Scripting, "Generating script")
        .await;
    let script = generate_validated_script(&ctx, &job).await?;

    // Deterministic timing model and the audio gate
    reporter
        .stage(JobStatus::AudioGen, "Synthesizing narration timing")
        .await;
    let timing = synthesize_script_timing(&script);
    let union = timing.union();
    let timing_report = validate_timing(&union, timing.total_ms, job.duration_seconds);
    if !timing_report.is_valid() {
        return Err(WorkerError::GateReject {
            stage: "audio",
            errors: timing_report.errors,
        });
    }

    // Dry runs stop after the script survives its gates
    if job.dry_run {
        info!(job_id = %job_id, "Dry run complete");
        return Ok(JobResult {
            output_path: None,
            script,
            duration_ms: timing.total_ms,
            scenes_rendered: 0,
        });
    }

    reporter
        .stage(JobStatus::CaptionGen, "Preparing caption timelines")
        .await;
    reporter
        .stage(JobStatus::VisualGen, "Processing scenes")
        .await;

    let outcomes = process_scenes(&ctx, &job, &script, &timing, &reporter).await?;

    reporter
        .stage(JobStatus::Editing, "Edit plans validated")
        .await;
    reporter
        .stage(JobStatus::EditReady, "All segments rendered")
        .await;

    // Concat barrier: every scene must be on disk before merging
    reporter
        .stage(JobStatus::Merging, "Concatenating segments")
        .await;
    let output_dir = ctx.config.output_dir();
    tokio::fs::create_dir_all(&output_dir).await?;
    let output_path = output_dir.join(format!("{job_id}.mp4"));
    let segment_paths: Vec<PathBuf> = outcomes.iter().map(|o| o.segment_path.clone()).collect();
    ctx.renderer
        .concat_scenes(&segment_paths, &output_path)
        .await
        .map_err(WorkerError::render)?;

    // Final quality audit over the aggregated metadata
    reporter
        .stage(JobStatus::Auditing, "Running final audit")
        .await;
    let verdict = audit(&AuditInput {
        script: &script,
        timestamps: &union,
    });
    if !verdict.go {
        return Err(WorkerError::AuditNoGo(verdict.reasons.join("; ")));
    }

    info!(job_id = %job_id, "Job complete: {}", output_path.display());
    Ok(JobResult {
        output_path: Some(output_path.to_string_lossy().to_string()),
        script,
        duration_ms: timing.total_ms,
        scenes_rendered: outcomes.len() as u32,
    })
}

/// Ask the oracle for a script until the gate passes or the attempt
/// budget runs out.
async fn generate_validated_script(ctx: &WorkerContext, job: &Job) -> WorkerResult<Script> {
    let mut last_errors = Vec::new();

    for attempt in 1..=ctx.config.script_attempts {
        let candidate = ctx
            .oracle
            .generate_script(&job.topic, job.duration_seconds, job.tone)
            .await
            .map_err(WorkerError::from_oracle)?;

        let report = validate_script(&candidate);
        if report.is_valid() {
            return Ok(candidate);
        }
        warn!(
            job_id = %job.id,
            "Script attempt {attempt} rejected: {}",
            report.summary()
        );
        last_errors = report.errors;
    }

    Err(WorkerError::GateReject {
        stage: "script",
        errors: last_errors,
    })
}

/// Fan scenes out in parallel and gather their outcomes in order.
async fn process_scenes(
    ctx: &Arc<WorkerContext>,
    job: &Job,
    script: &Script,
    timing: &ScriptTiming,
    reporter: &ProgressReporter,
) -> WorkerResult<Vec<SceneOutcome>> {
    let total = script.scenes.len();
    let mut join_set = JoinSet::new();

    for (index, (scene, scene_timing)) in script
        .scenes
        .iter()
        .zip(timing.scenes.iter())
        .enumerate()
    {
        let ctx = Arc::clone(ctx);
        let job_id = job.id.to_string();
        let target_seconds = job.duration_seconds;
        let scene = scene.clone();
        let scene_timing = scene_timing.clone();
        join_set.spawn(async move {
            process_scene(&ctx, &job_id, target_seconds, index, &scene, &scene_timing).await
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok(outcome)) => {
                let done = outcomes.len() + 1;
                let progress = 50 + (done * 30 / total) as u8;
                reporter
                    .tick(progress, format!("Scene {done}/{total} rendered"))
                    .await;
                outcomes.push(outcome);
            }
            Ok(Err(e)) => {
                join_set.abort_all();
                return Err(e);
            }
            Err(join_err) => {
                join_set.abort_all();
                let reason = if join_err.is_panic() {
                    "scene task panicked"
                } else {
                    "scene task cancelled"
                };
                return Err(WorkerError::Internal(reason.to_string()));
            }
        }
    }

    outcomes.sort_by_key(|o| o.index);
    Ok(outcomes)
}
