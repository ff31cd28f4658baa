//! Asset cache, downloads, marked-job persistence and retention.
//!
//! Scene tasks hammer the cache concurrently while pre-fetching and
//! selecting footage, so everything here is guarded for shared use.
//! Marked job IDs survive restarts in a single JSON file; retention
//! sweeps delete aged files unless a marked or active job claims them
//! through its filename.

pub mod cache;
pub mod download;
pub mod error;
pub mod marks;
pub mod retention;

pub use cache::AssetCache;
pub use download::AssetDownloader;
pub use error::{AssetError, AssetResult};
pub use marks::MarkStore;
pub use retention::{RetentionConfig, RetentionSweeper};
