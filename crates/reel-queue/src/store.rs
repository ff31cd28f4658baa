//! The process-wide job store.

use std::collections::{HashMap, VecDeque};

use tokio::sync::{Mutex, Notify};
use tracing::debug;

use reel_models::{Job, JobId, JobRequest};

#[derive(Default)]
struct StoreInner {
    /// Pending job IDs in arrival order
    fifo: VecDeque<JobId>,
    jobs: HashMap<JobId, Job>,
}

/// FIFO queue plus job records. No durability: a restart loses
/// everything.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<StoreInner>,
    notify: Notify,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job from a validated request, enqueue it, and wake a
    /// worker.
    pub async fn create(&self, request: JobRequest) -> Job {
        let job = Job::new(request);
        {
            let mut inner = self.inner.lock().await;
            inner.fifo.push_back(job.id.clone());
            inner.jobs.insert(job.id.clone(), job.clone());
        }
        debug!(job_id = %job.id, "Job enqueued");
        self.notify.notify_one();
        job
    }

    /// Remove and return the oldest pending job, if any.
    pub async fn pop_next(&self) -> Option<Job> {
        let mut inner = self.inner.lock().await;
        let id = inner.fifo.pop_front()?;
        inner.jobs.get(&id).cloned()
    }

    /// Wait until `create` signals new work.
    pub async fn wait_for_work(&self) {
        self.notify.notified().await;
    }

    /// Read a job by ID.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.inner.lock().await.jobs.get(id).cloned()
    }

    /// All job records, newest first.
    pub async fn list(&self) -> Vec<Job> {
        let inner = self.inner.lock().await;
        let mut jobs: Vec<Job> = inner.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Atomically mutate a job. Returns false if the ID is unknown.
    pub async fn update<F>(&self, id: &JobId, mutate: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        let mut inner = self.inner.lock().await;
        match inner.jobs.get_mut(id) {
            Some(job) => {
                mutate(job);
                true
            }
            None => false,
        }
    }

    /// IDs of jobs that are queued or in flight. Retention skips
    /// files belonging to these.
    pub async fn active_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .await
            .jobs
            .values()
            .filter(|job| !job.status.is_terminal())
            .map(|job| job.id.to_string())
            .collect()
    }

    /// Number of jobs still waiting for a worker.
    pub async fn queued_len(&self) -> usize {
        self.inner.lock().await.fifo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::{JobStatus, Tone};

    fn request(topic: &str) -> JobRequest {
        JobRequest {
            topic: topic.to_string(),
            duration_seconds: 30,
            tone: Tone::Informative,
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_fifo_ordering() {
        let store = JobStore::new();
        let first = store.create(request("first")).await;
        let second = store.create(request("second")).await;

        assert_eq!(store.queued_len().await, 2);
        assert_eq!(store.pop_next().await.unwrap().id, first.id);
        assert_eq!(store.pop_next().await.unwrap().id, second.id);
        assert!(store.pop_next().await.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_stored_record() {
        let store = JobStore::new();
        let job = store.create(request("topic")).await;

        let updated = store
            .update(&job.id, |job| {
                job.set_status(JobStatus::Processing, "Picked up")
            })
            .await;
        assert!(updated);
        assert_eq!(
            store.get(&job.id).await.unwrap().status,
            JobStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = JobStore::new();
        let updated = store
            .update(&JobId::from_string("nope"), |_| {})
            .await;
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_active_ids_exclude_terminal() {
        let store = JobStore::new();
        let running = store.create(request("running")).await;
        let done = store.create(request("done")).await;
        store
            .update(&done.id, |job| {
                job.set_status(JobStatus::Failed, "boom")
            })
            .await;

        let active = store.active_ids().await;
        assert!(active.contains(&running.id.to_string()));
        assert!(!active.contains(&done.id.to_string()));
    }

    #[tokio::test]
    async fn test_notify_wakes_waiter() {
        let store = std::sync::Arc::new(JobStore::new());
        let waiter = std::sync::Arc::clone(&store);
        let handle = tokio::spawn(async move {
            waiter.wait_for_work().await;
            waiter.pop_next().await
        });

        // Give the waiter a chance to park first
        tokio::task::yield_now().await;
        store.create(request("wake")).await;

        let popped = handle.await.unwrap();
        assert!(popped.is_some());
    }
}
