//! Job status state machine.

use serde::{Deserialize, Serialize};

/// Processing status of a generation job.
///
/// The lifecycle is `Queued → Processing → … → Completed | Failed`.
/// The intermediate stage statuses are informational snapshots of the
/// worker's position in the pipeline; only the owning worker mutates
/// them, and clients should treat anything between `Processing` and a
/// terminal state as "in flight".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in the FIFO for a worker slot
    #[default]
    Queued,
    /// Picked up by a worker
    Processing,
    /// Generating the script via the language-model oracle
    Scripting,
    /// Synthesizing narration audio and word timings
    AudioGen,
    /// Grouping word timings into caption segments
    CaptionGen,
    /// Building the visual timeline from stock footage
    VisualGen,
    /// Constructing the edit plan
    Editing,
    /// Edit plan validated, segments rendering
    EditReady,
    /// Concatenating rendered scene segments
    Merging,
    /// Running the final quality audit
    Auditing,
    /// Finished; `Job::result` holds the output path
    Completed,
    /// Failed; `Job::failure` holds the classified error
    Failed,
}

impl JobStatus {
    /// String representation used on the wire and in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Scripting => "scripting",
            JobStatus::AudioGen => "audio_gen",
            JobStatus::CaptionGen => "caption_gen",
            JobStatus::VisualGen => "visual_gen",
            JobStatus::Editing => "editing",
            JobStatus::EditReady => "edit_ready",
            JobStatus::Merging => "merging",
            JobStatus::Auditing => "auditing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Check if a worker currently owns the job.
    pub fn is_active(&self) -> bool {
        !matches!(self, JobStatus::Queued) && !self.is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Merging.is_terminal());
    }

    #[test]
    fn test_active_states() {
        assert!(!JobStatus::Queued.is_active());
        assert!(JobStatus::Scripting.is_active());
        assert!(JobStatus::Auditing.is_active());
        assert!(!JobStatus::Completed.is_active());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&JobStatus::AudioGen).unwrap();
        assert_eq!(json, "\"audio_gen\"");
    }
}
