//! In-process asset cache: keyword search results plus the set of
//! asset IDs already placed on a timeline.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use tracing::debug;

use reel_providers::StockAsset;

#[derive(Default)]
struct CacheInner {
    by_keyword: HashMap<String, Vec<StockAsset>>,
    used_ids: HashSet<String>,
}

/// Shared cache of search results and usage bookkeeping.
///
/// Keys are lower-cased keywords. Safe for concurrent scene tasks:
/// many readers, short write sections.
#[derive(Default)]
pub struct AssetCache {
    inner: RwLock<CacheInner>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store search results for a keyword, deduplicating by asset id.
    pub async fn insert(&self, keyword: &str, assets: Vec<StockAsset>) {
        let mut inner = self.inner.write().await;
        let entry = inner.by_keyword.entry(keyword.to_lowercase()).or_default();
        for asset in assets {
            if !entry.iter().any(|a| a.id == asset.id) {
                entry.push(asset);
            }
        }
    }

    /// Cached results for a keyword, if any search ran.
    pub async fn get(&self, keyword: &str) -> Option<Vec<StockAsset>> {
        self.inner
            .read()
            .await
            .by_keyword
            .get(&keyword.to_lowercase())
            .cloned()
    }

    pub async fn contains(&self, keyword: &str) -> bool {
        self.inner
            .read()
            .await
            .by_keyword
            .contains_key(&keyword.to_lowercase())
    }

    /// Record that an asset landed on a timeline.
    pub async fn mark_used(&self, asset_id: &str) {
        let mut inner = self.inner.write().await;
        if inner.used_ids.insert(asset_id.to_string()) {
            debug!("Asset {asset_id} marked used");
        }
    }

    pub async fn is_used(&self, asset_id: &str) -> bool {
        self.inner.read().await.used_ids.contains(asset_id)
    }

    /// Every distinct asset not yet placed, across all keywords.
    /// Layer-3 selection scans this when keyword supply runs out.
    pub async fn unused_assets(&self) -> Vec<StockAsset> {
        let inner = self.inner.read().await;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for assets in inner.by_keyword.values() {
            for asset in assets {
                if !inner.used_ids.contains(&asset.id) && seen.insert(asset.id.clone()) {
                    out.push(asset.clone());
                }
            }
        }
        out
    }

    /// Count of distinct unplaced assets; drives reuse policy.
    pub async fn unique_unused(&self) -> usize {
        self.unused_assets().await.len()
    }

    /// Every distinct asset regardless of usage, for last-resort reuse.
    pub async fn all_assets(&self) -> Vec<StockAsset> {
        let inner = self.inner.read().await;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for assets in inner.by_keyword.values() {
            for asset in assets {
                if seen.insert(asset.id.clone()) {
                    out.push(asset.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str) -> StockAsset {
        StockAsset {
            id: id.to_string(),
            url: None,
            provider: "mock",
            width: 1080,
            height: 1920,
            duration_s: 10.0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_lowercases_keys() {
        let cache = AssetCache::new();
        cache.insert("Coffee", vec![asset("a")]).await;
        assert!(cache.contains("coffee").await);
        assert_eq!(cache.get("COFFEE").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_deduplicates() {
        let cache = AssetCache::new();
        cache.insert("coffee", vec![asset("a"), asset("a")]).await;
        cache.insert("coffee", vec![asset("a"), asset("b")]).await;
        assert_eq!(cache.get("coffee").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_usage_tracking() {
        let cache = AssetCache::new();
        cache.insert("coffee", vec![asset("a"), asset("b")]).await;
        cache.insert("brain", vec![asset("b"), asset("c")]).await;

        assert_eq!(cache.unique_unused().await, 3);

        cache.mark_used("b").await;
        assert!(cache.is_used("b").await);
        assert_eq!(cache.unique_unused().await, 2);

        let unused: Vec<String> = cache
            .unused_assets()
            .await
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert!(unused.contains(&"a".to_string()));
        assert!(!unused.contains(&"b".to_string()));
    }
}
