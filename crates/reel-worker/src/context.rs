//! Application context: every handle the pipeline needs, composed
//! once at process start and shared by reference.

use std::sync::Arc;

use reel_assets::{AssetCache, AssetDownloader};
use reel_media::{FfmpegRenderer, Renderer};
use reel_providers::{
    LlmOracle, MockStockProvider, PexelsProvider, ScriptOracle, SpeechEngine, SpeechSynthesizer,
    StockProvider,
};
use reel_queue::JobStore;

use crate::config::WorkerConfig;

/// Shared handles for job processing.
///
/// There is no process-global state: the single composed context is
/// passed down explicitly, so tests can swap any collaborator.
pub struct WorkerContext {
    pub config: WorkerConfig,
    pub store: Arc<JobStore>,
    pub oracle: Arc<dyn ScriptOracle>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub stock: Arc<dyn StockProvider>,
    pub cache: Arc<AssetCache>,
    pub downloader: Arc<AssetDownloader>,
    pub renderer: Arc<dyn Renderer>,
}

impl WorkerContext {
    /// Compose the production context from the environment: real
    /// oracle and TTS chains, Pexels when a key is configured (the
    /// deterministic mock provider otherwise), FFmpeg rendering.
    pub fn from_env(config: WorkerConfig, store: Arc<JobStore>) -> Self {
        let stock: Arc<dyn StockProvider> = match PexelsProvider::from_env() {
            Some(provider) => Arc::new(provider),
            None => {
                tracing::warn!("PEXELS_API_KEY not set, using mock stock footage");
                Arc::new(MockStockProvider::new())
            }
        };

        let renderer = FfmpegRenderer {
            timeout_secs: config.render_timeout_secs,
        };

        Self {
            store,
            oracle: Arc::new(LlmOracle::from_env()),
            tts: Arc::new(SpeechEngine::from_env()),
            stock,
            cache: Arc::new(AssetCache::new()),
            downloader: Arc::new(AssetDownloader::new(config.clips_dir())),
            renderer: Arc::new(renderer),
            config,
        }
    }
}
