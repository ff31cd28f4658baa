//! Visual timeline construction.
//!
//! Clip lengths are drawn randomly inside the pacing bounds, assets
//! are selected through layered fallbacks, and every selected asset
//! is materialized on disk. The RNG is injectable so tests can pin
//! the draw sequence; the validation gate holds regardless of seed.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use reel_assets::{AssetCache, AssetDownloader};
use reel_models::{ClipTransform, Pan, VisualClip, Zoom};
use reel_providers::{StockAsset, StockProvider};
use reel_timeline::{
    fit_clip_duration, min_clip_duration_ms, reuse_required, validate_visual_timeline, MAX_CLIP_MS,
};

use crate::error::{WorkerError, WorkerResult};

/// Reserved cache key for the provider's broad fallback pool.
const FALLBACKS_KEY: &str = "__fallbacks";

/// Keyword used when a scene arrives with none.
const DEFAULT_KEYWORD: &str = "footage";

pub struct VisualTimelineBuilder {
    cache: Arc<AssetCache>,
    stock: Arc<dyn StockProvider>,
    downloader: Arc<AssetDownloader>,
    rng: SmallRng,
}

impl VisualTimelineBuilder {
    pub fn new(
        cache: Arc<AssetCache>,
        stock: Arc<dyn StockProvider>,
        downloader: Arc<AssetDownloader>,
    ) -> Self {
        Self {
            cache,
            stock,
            downloader,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Pin the RNG for deterministic draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Build a contiguous clip timeline covering `[0, duration_ms]`.
    pub async fn build(
        &mut self,
        job_id: &str,
        keywords: &[String],
        duration_ms: u64,
    ) -> WorkerResult<Vec<VisualClip>> {
        let keywords: Vec<String> = if keywords.is_empty() {
            vec![DEFAULT_KEYWORD.to_string()]
        } else {
            keywords.iter().map(|k| k.to_lowercase()).collect()
        };

        self.prefetch(&keywords).await;

        let unique_available = self.cache.unique_unused().await;
        let allow_reuse = reuse_required(duration_ms, unique_available);
        let min_clip_ms = min_clip_duration_ms(duration_ms, unique_available);
        if allow_reuse {
            warn!(
                "Only {unique_available} unused assets for {duration_ms}ms, enabling reuse"
            );
        }

        let mut clips: Vec<VisualClip> = Vec::new();
        let mut cursor = 0u64;
        let mut keyword_index = 0usize;

        while cursor < duration_ms {
            let remaining = duration_ms - cursor;
            let picked = self.rng.gen_range(min_clip_ms..=MAX_CLIP_MS);
            let clip_ms = fit_clip_duration(remaining, picked);

            let keyword = &keywords[keyword_index % keywords.len()];
            keyword_index += 1;

            let prev_clip_id = clips.last().map(|c| c.clip_id.clone());
            let (asset, reused) = self
                .select_asset(keyword, allow_reuse, prev_clip_id.as_deref())
                .await?;
            let local_path = self.downloader.ensure_local(&asset, job_id).await?;
            self.cache.mark_used(&asset.id).await;

            clips.push(VisualClip {
                clip_id: asset.id,
                provider: asset.provider.to_string(),
                local_path,
                start_ms: cursor,
                end_ms: cursor + clip_ms,
                keyword: keyword.clone(),
                transform: self.roll_transform(),
                reused,
            });
            cursor += clip_ms;
        }

        let report = validate_visual_timeline(&clips, duration_ms, allow_reuse);
        if !report.is_valid() {
            return Err(WorkerError::GateReject {
                stage: "visual",
                errors: report.errors,
            });
        }

        debug!(
            "Visual timeline: {} clips over {duration_ms}ms (reuse: {allow_reuse})",
            clips.len()
        );
        Ok(clips)
    }

    /// Search every uncached keyword concurrently and prime the cache.
    async fn prefetch(&self, keywords: &[String]) {
        let mut missing = Vec::new();
        for keyword in keywords {
            if !self.cache.contains(keyword).await && !missing.contains(keyword) {
                missing.push(keyword.clone());
            }
        }

        let searches = missing.iter().map(|keyword| {
            let stock = Arc::clone(&self.stock);
            async move { (keyword.clone(), stock.search(keyword).await) }
        });
        for (keyword, result) in futures_util::future::join_all(searches).await {
            match result {
                Ok(assets) => self.cache.insert(&keyword, assets).await,
                Err(e) => {
                    warn!("Stock search for \"{keyword}\" failed: {e}");
                    self.cache.insert(&keyword, Vec::new()).await;
                }
            }
        }
    }

    /// Layered asset selection: exact keyword, provider fallbacks,
    /// whole-database scan, then last-resort reuse.
    async fn select_asset(
        &self,
        keyword: &str,
        allow_reuse: bool,
        prev_clip_id: Option<&str>,
    ) -> WorkerResult<(StockAsset, bool)> {
        // L1: exact keyword cache, unused first
        if let Some(assets) = self.cache.get(keyword).await {
            if let Some(asset) = self.first_unused(&assets).await {
                return Ok((asset, false));
            }
        }

        // L2: the provider's broad fallback pool
        if !self.cache.contains(FALLBACKS_KEY).await {
            match self.stock.fallbacks().await {
                Ok(assets) => self.cache.insert(FALLBACKS_KEY, assets).await,
                Err(e) => {
                    warn!("Fallback pool fetch failed: {e}");
                    self.cache.insert(FALLBACKS_KEY, Vec::new()).await;
                }
            }
        }
        if let Some(assets) = self.cache.get(FALLBACKS_KEY).await {
            if let Some(asset) = self.first_unused(&assets).await {
                debug!("Keyword \"{keyword}\" fell back to the broad pool");
                return Ok((asset, false));
            }
        }

        // L3: anything unused anywhere
        if let Some(asset) = self.cache.unused_assets().await.into_iter().next() {
            debug!("Keyword \"{keyword}\" fell back to a database scan");
            return Ok((asset, false));
        }

        // L4: reuse, never back to back
        if allow_reuse {
            if let Some(asset) = self
                .cache
                .all_assets()
                .await
                .into_iter()
                .find(|a| prev_clip_id != Some(a.id.as_str()))
            {
                warn!("Keyword \"{keyword}\" reusing asset {}", asset.id);
                return Ok((asset, true));
            }
        }

        Err(WorkerError::AssetShortage(format!(
            "No assets available for \"{keyword}\""
        )))
    }

    async fn first_unused(&self, assets: &[StockAsset]) -> Option<StockAsset> {
        for asset in assets {
            if !self.cache.is_used(&asset.id).await {
                return Some(asset.clone());
            }
        }
        None
    }

    /// Half of the clips get a zoom, half get a pan.
    fn roll_transform(&mut self) -> ClipTransform {
        let zoom = if self.rng.gen_bool(0.5) {
            if self.rng.gen_bool(0.5) {
                Zoom::Subtle
            } else {
                Zoom::Strong
            }
        } else {
            Zoom::None
        };
        let pan = if self.rng.gen_bool(0.5) {
            Pan::ALL[self.rng.gen_range(1..Pan::ALL.len())]
        } else {
            Pan::None
        };
        ClipTransform { zoom, pan }
    }
}
