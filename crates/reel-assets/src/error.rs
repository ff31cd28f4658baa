//! Asset error types.

use std::path::PathBuf;
use thiserror::Error;

pub type AssetResult<T> = Result<T, AssetError>;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Download failed for {asset_id}: {message}")]
    DownloadFailed { asset_id: String, message: String },

    #[error("Placeholder missing: {0}")]
    PlaceholderMissing(PathBuf),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Persistence error: {0}")]
    Persist(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    pub fn download_failed(asset_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            asset_id: asset_id.into(),
            message: message.into(),
        }
    }
}
