//! FFmpeg CLI wrapper for the reel renderer.
//!
//! Builds the vertical 1080x1920 filter graphs, writes them to script
//! files (command lines would overflow otherwise), runs FFmpeg with
//! explicit argv, verifies outputs, and classifies failures. Also
//! owns the silent-WAV fallback used when no speech engine is
//! available.

pub mod command;
pub mod error;
pub mod filters;
pub mod render;
pub mod wav;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{classify_stderr, MediaError, MediaResult, RenderErrorKind};
pub use render::{FfmpegRenderer, RenderSpec, Renderer, MIN_OUTPUT_BYTES};
pub use wav::write_silent_wav;
