//! Age-based retention sweeps.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::error::AssetResult;
use crate::marks::MarkStore;

/// Retention configuration.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Directories to sweep
    pub roots: Vec<PathBuf>,
    /// Files older than this are candidates for deletion
    pub max_age: Duration,
    /// How often to sweep after the startup pass
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            max_age: Duration::from_secs(7 * 24 * 3600),
            sweep_interval: Duration::from_secs(24 * 3600),
        }
    }
}

/// Deletes aged files unless a marked or active job ID appears in the
/// filename.
pub struct RetentionSweeper {
    config: RetentionConfig,
    marks: Arc<MarkStore>,
}

impl RetentionSweeper {
    pub fn new(config: RetentionConfig, marks: Arc<MarkStore>) -> Self {
        Self { config, marks }
    }

    pub fn interval(&self) -> Duration {
        self.config.sweep_interval
    }

    /// One sweep over every configured root. `active_jobs` are the IDs
    /// of jobs currently queued or processing; their files are never
    /// touched even when aged.
    pub async fn sweep(&self, active_jobs: &HashSet<String>) -> AssetResult<usize> {
        let protected: Vec<String> = self
            .marks
            .all()
            .await
            .into_iter()
            .chain(active_jobs.iter().cloned())
            .collect();

        let cutoff = SystemTime::now() - self.config.max_age;
        let mut deleted = 0usize;

        for root in &self.config.roots {
            let mut entries = match tokio::fs::read_dir(root).await {
                Ok(entries) => entries,
                Err(_) => {
                    debug!("Retention root {} missing, skipping", root.display());
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let Ok(metadata) = entry.metadata().await else {
                    continue;
                };
                if !metadata.is_file() {
                    continue;
                }
                let Ok(modified) = metadata.modified() else {
                    continue;
                };
                if modified >= cutoff {
                    continue;
                }

                let name = entry.file_name().to_string_lossy().to_string();
                if protected.iter().any(|id| name.contains(id.as_str())) {
                    debug!("Retention keeping protected file {name}");
                    continue;
                }

                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        deleted += 1;
                        debug!("Retention deleted {}", path.display());
                    }
                    Err(e) => warn!("Retention failed to delete {}: {e}", path.display()),
                }
            }
        }

        if deleted > 0 {
            info!("Retention sweep deleted {deleted} files");
        }
        Ok(deleted)
    }
}
