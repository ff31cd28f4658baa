//! Deterministic timeline algorithms and validation gates.
//!
//! Everything in this crate is pure: no I/O, no clocks, no randomness.
//! The worker feeds stage outputs through these functions and treats a
//! failed gate as a stage rejection.
//!
//! - [`script_gate`]: structural validation of generated scripts
//! - [`timing`]: word-level timestamp synthesis and the audio gate
//! - [`captions`]: greedy caption grouping and its gate
//! - [`pacing`]: visual pacing math and the visual timeline gate
//! - [`edit_plan`]: edit plan construction and its gate
//! - [`audit`]: the final GO/NO-GO quality audit

pub mod audit;
pub mod captions;
pub mod edit_plan;
pub mod gate;
pub mod pacing;
pub mod script_gate;
pub mod timing;

pub use audit::{audit, AuditInput, Verdict};
pub use captions::{group_captions, validate_captions};
pub use edit_plan::{build_edit_plan, validate_edit_plan, EditPlanError};
pub use gate::GateReport;
pub use pacing::{
    fit_clip_duration, min_clip_duration_ms, reuse_required, validate_visual_timeline,
    MAX_CLIP_MS, MIN_CLIP_MS,
};
pub use script_gate::{matches_curiosity_pattern, validate_keywords, validate_script};
pub use timing::{
    is_emphasis_word, synthesize_script_timing, validate_timing, SceneTiming, ScriptTiming,
};
