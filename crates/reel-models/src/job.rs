//! Job records and lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::script::{Script, Tone};
use crate::status::JobStatus;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated generation request, as accepted by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Topic to generate a video about (1-200 chars)
    pub topic: String,
    /// Target video length in seconds (20-60)
    pub duration_seconds: u32,
    pub tone: Tone,
    /// Stop after script generation and return the script
    #[serde(default)]
    pub dry_run: bool,
}

/// Successful outcome of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Final MP4 path; absent for dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// The script the video was built from
    pub script: Script,
    /// Total narration duration in milliseconds
    pub duration_ms: u64,
    /// Number of scene segments rendered (0 for dry runs)
    #[serde(default)]
    pub scenes_rendered: u32,
}

/// Classified failure surfaced to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    /// Human-readable error message
    pub error: String,
    /// Stable classification (oracle_fatal, gate_reject, render_failure, ...)
    pub error_type: String,
    /// Per-stage detail lines (gate errors, captured stderr tail)
    #[serde(default)]
    pub diagnostics: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobFailure {
    pub fn new(error: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_type: error_type.into(),
            diagnostics: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// A video generation job.
///
/// Created by the API on request, owned and mutated exclusively by the
/// worker that picks it up, retained in the store until the retention
/// sweep discards it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub topic: String,
    pub duration_seconds: u32,
    pub tone: Tone,
    pub dry_run: bool,

    pub status: JobStatus,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Estimated seconds until completion, while in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,
    /// Latest human-readable progress message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<JobFailure>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued job from a validated request.
    pub fn new(request: JobRequest) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            topic: request.topic,
            duration_seconds: request.duration_seconds,
            tone: request.tone,
            dry_run: request.dry_run,
            status: JobStatus::Queued,
            progress: 0,
            eta_seconds: None,
            message: "Queued".to_string(),
            result: None,
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a new status with a progress message.
    pub fn set_status(&mut self, status: JobStatus, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
        self.updated_at = Utc::now();
    }

    /// Update progress and the remaining-time estimate.
    pub fn set_progress(&mut self, progress: u8, eta_seconds: Option<u64>) {
        self.progress = progress.min(100);
        self.eta_seconds = eta_seconds;
        self.updated_at = Utc::now();
    }

    /// Mark completed with the final result.
    pub fn complete(&mut self, result: JobResult) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.eta_seconds = None;
        self.message = "Completed".to_string();
        self.result = Some(result);
        self.updated_at = Utc::now();
    }

    /// Mark failed with a classified error.
    pub fn fail(&mut self, failure: JobFailure) {
        self.status = JobStatus::Failed;
        self.eta_seconds = None;
        self.message = failure.error.clone();
        self.failure = Some(failure);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> JobRequest {
        JobRequest {
            topic: "The Science of Caffeine".to_string(),
            duration_seconds: 30,
            tone: Tone::Informative,
            dry_run: false,
        }
    }

    #[test]
    fn test_job_creation() {
        let job = Job::new(request());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(Uuid::parse_str(job.id.as_str()).is_ok());
    }

    #[test]
    fn test_job_transitions() {
        let mut job = Job::new(request());

        job.set_status(JobStatus::Processing, "Picked up");
        assert_eq!(job.status, JobStatus::Processing);

        job.set_progress(40, Some(25));
        assert_eq!(job.progress, 40);
        assert_eq!(job.eta_seconds, Some(25));

        job.fail(JobFailure::new("render exploded", "render_failure"));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.failure.is_some());
        assert!(job.eta_seconds.is_none());
    }

    #[test]
    fn test_progress_clamped() {
        let mut job = Job::new(request());
        job.set_progress(150, None);
        assert_eq!(job.progress, 100);
    }
}
