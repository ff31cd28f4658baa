//! Marked-job persistence.
//!
//! Marks protect a job's files from retention. The set lives in one
//! JSON array on disk; every mutation rewrites the file atomically
//! (temp file + rename).

use std::collections::HashSet;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::AssetResult;

/// Persistent set of marked job IDs.
pub struct MarkStore {
    path: PathBuf,
    marks: RwLock<HashSet<String>>,
}

impl MarkStore {
    /// Load the store, tolerating a missing or empty file.
    pub async fn load(path: impl Into<PathBuf>) -> AssetResult<Self> {
        let path = path.into();
        let marks = match tokio::fs::read_to_string(&path).await {
            Ok(content) if !content.trim().is_empty() => {
                serde_json::from_str::<Vec<String>>(&content)?
                    .into_iter()
                    .collect()
            }
            _ => HashSet::new(),
        };
        Ok(Self {
            path,
            marks: RwLock::new(marks),
        })
    }

    /// Mark a job ID. Idempotent.
    pub async fn mark(&self, job_id: &str) -> AssetResult<()> {
        let mut marks = self.marks.write().await;
        if marks.insert(job_id.to_string()) {
            info!("Marked job {job_id}");
            self.persist(&marks).await?;
        }
        Ok(())
    }

    /// Remove a mark. Idempotent.
    pub async fn unmark(&self, job_id: &str) -> AssetResult<()> {
        let mut marks = self.marks.write().await;
        if marks.remove(job_id) {
            info!("Unmarked job {job_id}");
            self.persist(&marks).await?;
        }
        Ok(())
    }

    pub async fn is_marked(&self, job_id: &str) -> bool {
        self.marks.read().await.contains(job_id)
    }

    /// Snapshot of all marked IDs.
    pub async fn all(&self) -> Vec<String> {
        self.marks.read().await.iter().cloned().collect()
    }

    async fn persist(&self, marks: &HashSet<String>) -> AssetResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut sorted: Vec<&String> = marks.iter().collect();
        sorted.sort();
        let content = serde_json::to_string_pretty(&sorted)?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}
