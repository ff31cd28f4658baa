//! In-memory job store, FIFO queue and progress reporting.
//!
//! Jobs live and die with the process: a strict FIFO of pending IDs
//! plus an ID-to-record map, both behind one mutex so every accessor
//! is serialized. A `Notify` wakes the worker pool when work arrives.

pub mod progress;
pub mod store;

pub use progress::{stage_progress, ProgressReporter};
pub use store::JobStore;
