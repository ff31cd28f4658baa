//! Asset materialization: remote downloads and mock placeholders.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use reel_providers::StockAsset;

use crate::error::{AssetError, AssetResult};

/// Ensures every selected asset has a file on disk.
///
/// Filenames embed the job id so retention can tie files back to
/// marked jobs.
pub struct AssetDownloader {
    client: Client,
    clips_dir: PathBuf,
    /// Copied for mock assets; a stub is written when unset
    placeholder: Option<PathBuf>,
}

impl AssetDownloader {
    pub fn new(clips_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            clips_dir: clips_dir.into(),
            placeholder: None,
        }
    }

    /// Use a real video file as the placeholder for mock assets.
    pub fn with_placeholder(mut self, path: impl Into<PathBuf>) -> Self {
        self.placeholder = Some(path.into());
        self
    }

    /// Materialize the asset locally, downloading at most once.
    pub async fn ensure_local(&self, asset: &StockAsset, job_id: &str) -> AssetResult<PathBuf> {
        tokio::fs::create_dir_all(&self.clips_dir).await?;
        let path = self.clips_dir.join(format!("{job_id}_{}.mp4", asset.id));

        if path.exists() {
            debug!("Asset {} already on disk", asset.id);
            return Ok(path);
        }

        match &asset.url {
            Some(url) => self.download(asset, url, &path).await?,
            None => self.write_placeholder(&path).await?,
        }

        Ok(path)
    }

    async fn download(&self, asset: &StockAsset, url: &str, path: &Path) -> AssetResult<()> {
        info!("Downloading asset {} from {url}", asset.id);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::download_failed(
                &asset.id,
                format!("HTTP {}", response.status()),
            ));
        }

        // Stream to a temp path, then rename so readers never see a
        // partial file
        let tmp_path = path.with_extension("part");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AssetError::Network)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn write_placeholder(&self, path: &Path) -> AssetResult<()> {
        match &self.placeholder {
            Some(placeholder) => {
                if !placeholder.exists() {
                    return Err(AssetError::PlaceholderMissing(placeholder.clone()));
                }
                tokio::fs::copy(placeholder, path).await?;
            }
            None => {
                // Stub content keeps the pipeline moving in mock runs
                tokio::fs::write(path, vec![0u8; 16 * 1024]).await?;
            }
        }
        debug!("Placed placeholder at {}", path.display());
        Ok(())
    }
}
