//! End-to-end pipeline tests against mock collaborators.
//!
//! The renderer stub writes plausible files instead of invoking
//! FFmpeg, so the whole job pipeline runs hermetically.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use reel_assets::{AssetCache, AssetDownloader};
use reel_media::{MediaError, MediaResult, RenderSpec, Renderer};
use reel_models::{JobRequest, JobStatus, Scene, SceneKind, Script, Tone};
use reel_providers::{fallback_script, MockOracle, MockStockProvider, SpeechEngine};
use reel_queue::JobStore;
use reel_worker::{run_job, JobExecutor, WorkerConfig, WorkerContext};

/// Renderer stub: writes files big enough to pass output checks.
struct StubRenderer;

#[async_trait]
impl Renderer for StubRenderer {
    async fn render_scene(
        &self,
        spec: RenderSpec<'_>,
        _work_dir: &Path,
        output: &Path,
    ) -> MediaResult<()> {
        assert!(!spec.segments.is_empty());
        assert!(spec.audio_path.exists());
        tokio::fs::write(output, vec![0u8; 16 * 1024]).await?;
        Ok(())
    }

    async fn concat_scenes(&self, scene_paths: &[PathBuf], output: &Path) -> MediaResult<()> {
        for path in scene_paths {
            if !path.exists() {
                return Err(MediaError::OutputMissing(path.clone()));
            }
        }
        tokio::fs::write(output, vec![0u8; 32 * 1024]).await?;
        Ok(())
    }
}

fn test_context(dir: &Path, script: Script) -> Arc<WorkerContext> {
    let config = WorkerConfig {
        max_concurrent_jobs: 2,
        data_dir: dir.to_path_buf(),
        render_timeout_secs: None,
        ..Default::default()
    };
    Arc::new(WorkerContext {
        store: Arc::new(JobStore::new()),
        oracle: Arc::new(MockOracle::new(script)),
        tts: Arc::new(SpeechEngine::silent()),
        stock: Arc::new(MockStockProvider::new()),
        cache: Arc::new(AssetCache::new()),
        downloader: Arc::new(AssetDownloader::new(config.clips_dir())),
        renderer: Arc::new(StubRenderer),
        config,
    })
}

fn request(dry_run: bool) -> JobRequest {
    JobRequest {
        topic: "The Science of Caffeine".to_string(),
        duration_seconds: 30,
        tone: Tone::Informative,
        dry_run,
    }
}

#[tokio::test]
async fn test_full_job_completes() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path(), fallback_script("The Science of Caffeine"));

    let job = ctx.store.create(request(false)).await;
    let result = run_job(Arc::clone(&ctx), job.clone()).await.unwrap();

    assert_eq!(result.scenes_rendered, 7);
    let output_path = result.output_path.expect("output path missing");
    assert!(PathBuf::from(&output_path).exists());
    assert!(output_path.contains(job.id.as_str()));
    assert!(result.duration_ms > 0);
}

#[tokio::test]
async fn test_dry_run_stops_after_script() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path(), fallback_script("The Science of Caffeine"));

    let job = ctx.store.create(request(true)).await;
    let result = run_job(Arc::clone(&ctx), job).await.unwrap();

    assert!(result.output_path.is_none());
    assert_eq!(result.scenes_rendered, 0);
    assert_eq!(result.script.scenes.len(), 7);
    // No scene segments were produced
    assert!(!ctx.config.temp_output_dir().exists());
}

#[tokio::test]
async fn test_rejected_script_fails_job_after_attempts() {
    let dir = tempfile::tempdir().unwrap();
    // Hook violates the banned-phrase rule; the mock returns it every
    // attempt, so three rejections fail the job.
    let mut script = fallback_script("Coffee");
    script.scenes[0].text = "In this video we explain coffee".to_string();
    let ctx = test_context(dir.path(), script);

    let job = ctx.store.create(request(false)).await;
    let err = run_job(Arc::clone(&ctx), job).await.unwrap_err();
    assert_eq!(err.error_type(), "gate_reject:script");
}

#[tokio::test]
async fn test_polite_ending_fails_audit() {
    let dir = tempfile::tempdir().unwrap();
    // Passes the script gate (4 words) but trips the final auditor.
    let mut script = fallback_script("Coffee");
    script.scenes[6] = Scene::new(
        SceneKind::Ending,
        "Thank you for watching",
        vec!["coffee".to_string(), "cup".to_string()],
    );
    let ctx = test_context(dir.path(), script);

    let job = ctx.store.create(request(false)).await;
    let err = run_job(Arc::clone(&ctx), job).await.unwrap_err();
    assert_eq!(err.error_type(), "audit_nogo");
    assert!(err.to_string().contains("complete/polite"));
}

#[tokio::test]
async fn test_executor_drives_job_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path(), fallback_script("The Science of Caffeine"));
    let executor = Arc::new(JobExecutor::new(Arc::clone(&ctx)));
    let shutdown = executor.shutdown_handle();

    let runner = Arc::clone(&executor);
    let handle = tokio::spawn(async move { runner.run().await });

    let job = ctx.store.create(request(false)).await;

    // Poll until the worker finishes
    let mut status = JobStatus::Queued;
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        status = ctx.store.get(&job.id).await.unwrap().status;
        if status.is_terminal() {
            break;
        }
    }
    assert_eq!(status, JobStatus::Completed);

    let stored = ctx.store.get(&job.id).await.unwrap();
    assert_eq!(stored.progress, 100);
    assert!(stored.result.is_some());

    shutdown.send(true).ok();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_executor_funnels_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut script = fallback_script("Coffee");
    script.scenes[0].text = "In this video we explain coffee".to_string();
    let ctx = test_context(dir.path(), script);
    let executor = Arc::new(JobExecutor::new(Arc::clone(&ctx)));
    let shutdown = executor.shutdown_handle();

    let runner = Arc::clone(&executor);
    let handle = tokio::spawn(async move { runner.run().await });

    let job = ctx.store.create(request(false)).await;

    let mut stored = None;
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let job = ctx.store.get(&job.id).await.unwrap();
        if job.status.is_terminal() {
            stored = Some(job);
            break;
        }
    }
    let stored = stored.expect("job never finished");
    assert_eq!(stored.status, JobStatus::Failed);
    let failure = stored.failure.expect("failure record missing");
    assert_eq!(failure.error_type, "gate_reject:script");
    assert!(!failure.diagnostics.is_empty());

    shutdown.send(true).ok();
    handle.await.unwrap();
}
