//! Worker pool executor.
//!
//! Pulls jobs off the FIFO under a concurrency cap, drives each
//! through the pipeline, and funnels every failure (including panics)
//! into a classified FAILED record. Nothing thrown here crosses the
//! task boundary.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tracing::{error, info};

use reel_models::Job;

use crate::context::WorkerContext;
use crate::error::WorkerError;
use crate::pipeline::run_job;

/// Bounded worker pool over the in-memory queue.
pub struct JobExecutor {
    ctx: Arc<WorkerContext>,
    semaphore: Arc<Semaphore>,
    shutdown: watch::Sender<bool>,
}

impl JobExecutor {
    pub fn new(ctx: Arc<WorkerContext>) -> Self {
        let semaphore = Arc::new(Semaphore::new(ctx.config.max_concurrent_jobs));
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            semaphore,
            shutdown,
        }
    }

    /// Signal handle for graceful shutdown.
    pub fn shutdown_handle(&self) -> watch::Sender<bool> {
        self.shutdown.clone()
    }

    /// Run until shut down.
    pub async fn run(&self) {
        info!(
            "Worker pool started with {} slots",
            self.ctx.config.max_concurrent_jobs
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        // Drain anything enqueued before we started listening
        self.drain().await;

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = self.ctx.store.wait_for_work() => {
                    self.drain().await;
                }
            }
        }

        info!("Worker pool stopped");
    }

    /// Claim a slot, pop the next job, spawn it; repeat until the
    /// queue is empty. Strict FIFO: the pop happens only once a slot
    /// is held.
    async fn drain(&self) {
        loop {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            match self.ctx.store.pop_next().await {
                Some(job) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let _permit = permit;
                        execute_job(ctx, job).await;
                    });
                }
                None => {
                    drop(permit);
                    return;
                }
            }
        }
    }
}

/// Run one job and publish its outcome. Panics inside the pipeline
/// are contained here and surface as classified failures.
async fn execute_job(ctx: Arc<WorkerContext>, job: Job) {
    let job_id = job.id.clone();
    info!(job_id = %job_id, topic = %job.topic, "Executing job");

    let handle = tokio::spawn(run_job(Arc::clone(&ctx), job));
    let result = match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(WorkerError::Internal(if join_err.is_panic() {
            "job task panicked".to_string()
        } else {
            "job task cancelled".to_string()
        })),
    };

    match result {
        Ok(result) => {
            ctx.store.update(&job_id, |job| job.complete(result)).await;
            info!(job_id = %job_id, "Job completed");
        }
        Err(e) => {
            error!(job_id = %job_id, "Job failed: {e}");
            let failure = e.into_failure();
            ctx.store.update(&job_id, |job| job.fail(failure)).await;
        }
    }
}
