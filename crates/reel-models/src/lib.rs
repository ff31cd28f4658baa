//! Shared data models for the Reelforge backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and the job status state machine
//! - Generated scripts (scenes, tones, keywords)
//! - Word-level audio timings and pacing metadata
//! - Caption segments and their static styling
//! - Visual clips with zoom/pan transforms
//! - Edit plan segments

pub mod caption;
pub mod edit;
pub mod job;
pub mod script;
pub mod status;
pub mod timing;
pub mod visual;

// Re-export common types
pub use caption::{Caption, CaptionStyle};
pub use edit::{CaptionRef, EditSegment, SegmentReason};
pub use job::{Job, JobFailure, JobId, JobRequest, JobResult};
pub use script::{count_words, Scene, SceneKind, Script, Tone, SCENE_COUNT};
pub use status::JobStatus;
pub use timing::{AudioResult, Pacing, WordTimestamp};
pub use visual::{ClipTransform, Pan, VisualClip, Zoom};
