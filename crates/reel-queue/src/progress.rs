//! Progress percentages and remaining-time estimates.

use std::sync::Arc;
use std::time::Instant;

use reel_models::{JobId, JobStatus};

use crate::store::JobStore;

/// Nominal progress for each pipeline stage.
pub fn stage_progress(status: JobStatus) -> u8 {
    match status {
        JobStatus::Queued => 0,
        JobStatus::Processing => 5,
        JobStatus::Scripting => 10,
        JobStatus::AudioGen => 25,
        JobStatus::CaptionGen => 35,
        JobStatus::VisualGen => 50,
        JobStatus::Editing => 65,
        JobStatus::EditReady => 70,
        JobStatus::Merging => 85,
        JobStatus::Auditing => 95,
        JobStatus::Completed => 100,
        JobStatus::Failed => 100,
    }
}

/// Linear remaining-time estimate from elapsed time and progress.
fn estimate_eta_seconds(progress: u8, elapsed_secs: f64) -> Option<u64> {
    if progress == 0 || progress >= 100 {
        return None;
    }
    let remaining = elapsed_secs * (100.0 - progress as f64) / progress as f64;
    Some(remaining.round() as u64)
}

/// Writes stage transitions and progress into the job record.
///
/// One reporter per job, owned by the worker driving it.
pub struct ProgressReporter {
    store: Arc<JobStore>,
    job_id: JobId,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(store: Arc<JobStore>, job_id: JobId) -> Self {
        Self {
            store,
            job_id,
            started: Instant::now(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Enter a pipeline stage.
    pub async fn stage(&self, status: JobStatus, message: impl Into<String>) {
        let progress = stage_progress(status);
        let eta = estimate_eta_seconds(progress, self.started.elapsed().as_secs_f64());
        let message = message.into();
        self.store
            .update(&self.job_id, |job| {
                job.set_status(status, message);
                job.set_progress(progress, eta);
            })
            .await;
    }

    /// Report fine-grained progress within the current stage.
    pub async fn tick(&self, progress: u8, message: impl Into<String>) {
        let eta = estimate_eta_seconds(progress, self.started.elapsed().as_secs_f64());
        let message = message.into();
        self.store
            .update(&self.job_id, |job| {
                job.message = message;
                job.set_progress(progress, eta);
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{JobRequest, Tone};

    #[test]
    fn test_stage_progress_is_monotonic() {
        let stages = [
            JobStatus::Queued,
            JobStatus::Processing,
            JobStatus::Scripting,
            JobStatus::AudioGen,
            JobStatus::CaptionGen,
            JobStatus::VisualGen,
            JobStatus::Editing,
            JobStatus::EditReady,
            JobStatus::Merging,
            JobStatus::Auditing,
            JobStatus::Completed,
        ];
        for pair in stages.windows(2) {
            assert!(stage_progress(pair[0]) < stage_progress(pair[1]) || pair[1] == JobStatus::Completed);
        }
    }

    #[test]
    fn test_eta_estimate() {
        // Half done after 30s: about 30s left
        assert_eq!(estimate_eta_seconds(50, 30.0), Some(30));
        assert_eq!(estimate_eta_seconds(0, 30.0), None);
        assert_eq!(estimate_eta_seconds(100, 30.0), None);
    }

    #[tokio::test]
    async fn test_reporter_writes_through() {
        let store = Arc::new(JobStore::new());
        let job = store
            .create(JobRequest {
                topic: "topic".to_string(),
                duration_seconds: 30,
                tone: Tone::Neutral,
                dry_run: false,
            })
            .await;

        let reporter = ProgressReporter::new(Arc::clone(&store), job.id.clone());
        reporter.stage(JobStatus::Scripting, "Generating script").await;

        let stored = store.get(&job.id).await.unwrap();
        assert_eq!(stored.status, JobStatus::Scripting);
        assert_eq!(stored.progress, 10);
        assert_eq!(stored.message, "Generating script");
    }
}
