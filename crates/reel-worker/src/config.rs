//! Worker configuration.

use std::path::PathBuf;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Jobs processed at once; the rest stay queued
    pub max_concurrent_jobs: usize,
    /// Root for all generated files
    pub data_dir: PathBuf,
    /// Script generation attempts before the job fails
    pub script_attempts: u32,
    /// Visual timeline attempts per scene before the job fails
    pub visual_attempts: u32,
    /// Kill a single FFmpeg run after this many seconds
    pub render_timeout_secs: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 3,
            data_dir: PathBuf::from("."),
            script_attempts: 3,
            visual_attempts: 2,
            render_timeout_secs: Some(600),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(600)),
            ..Default::default()
        }
    }

    /// Narration audio files.
    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir.join("assets").join("audio")
    }

    /// Downloaded and placeholder stock clips.
    pub fn clips_dir(&self) -> PathBuf {
        self.data_dir.join("assets").join("clips")
    }

    /// Rendered per-scene segments awaiting concat.
    pub fn temp_output_dir(&self) -> PathBuf {
        self.data_dir.join("temp_output")
    }

    /// Filter scripts and other render scratch files.
    pub fn temp_render_dir(&self) -> PathBuf {
        self.data_dir.join("temp_render")
    }

    /// Re-render cache exposed at /cache.
    pub fn cache_render_dir(&self) -> PathBuf {
        self.data_dir.join("cache_render")
    }

    /// Final published videos, exposed at /output.
    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    /// Marked-job persistence file.
    pub fn marks_path(&self) -> PathBuf {
        self.data_dir.join("marked_assets.json")
    }

    /// Directories the retention sweeper walks.
    pub fn retention_roots(&self) -> Vec<PathBuf> {
        vec![
            self.audio_dir(),
            self.clips_dir(),
            self.temp_output_dir(),
            self.temp_render_dir(),
            self.cache_render_dir(),
            self.output_dir(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_layout() {
        let config = WorkerConfig {
            data_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(config.audio_dir(), PathBuf::from("/data/assets/audio"));
        assert_eq!(config.clips_dir(), PathBuf::from("/data/assets/clips"));
        assert_eq!(config.marks_path(), PathBuf::from("/data/marked_assets.json"));
        assert_eq!(config.retention_roots().len(), 6);
    }
}
