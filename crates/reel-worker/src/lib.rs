//! Worker pool, per-job pipeline and per-scene processing.
//!
//! The executor pulls jobs from the in-memory queue under a
//! concurrency cap; each job runs the stage pipeline (script, timing,
//! scenes in parallel, concat, audit) with every stage output checked
//! by a gate from `reel-timeline`.

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod scene;
pub mod visual_timeline;

pub use config::WorkerConfig;
pub use context::WorkerContext;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use pipeline::run_job;
pub use scene::{process_scene, SceneOutcome};
pub use visual_timeline::VisualTimelineBuilder;
