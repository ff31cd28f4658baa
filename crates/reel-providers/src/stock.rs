//! Stock footage providers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// Broad searches used when a scene's own keywords come up empty.
const FALLBACK_KEYWORDS: [&str; 4] = ["city", "nature", "people", "technology"];

/// A downloadable (or mock) footage candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct StockAsset {
    /// Provider-scoped id, unique across the process
    pub id: String,
    /// Remote video URL; `None` for mock placeholder assets
    pub url: Option<String>,
    /// Provider name ("pexels", "mock")
    pub provider: &'static str,
    pub width: u32,
    pub height: u32,
    pub duration_s: f64,
}

/// Capability interface for stock search.
#[async_trait]
pub trait StockProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Search portrait footage for a keyword.
    async fn search(&self, keyword: &str) -> ProviderResult<Vec<StockAsset>>;

    /// Generic broad-appeal assets for when keyword search runs dry.
    async fn fallbacks(&self) -> ProviderResult<Vec<StockAsset>>;
}

/// Pexels video search.
pub struct PexelsProvider {
    api_key: String,
    client: Client,
    base_url: String,
}

impl PexelsProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: "https://api.pexels.com".to_string(),
        }
    }

    /// Build from `PEXELS_API_KEY`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("PEXELS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(Self::new)
    }

    /// Override the API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn search_raw(&self, query: &str) -> ProviderResult<Vec<StockAsset>> {
        let url = format!("{}/videos/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("orientation", "portrait"),
                ("per_page", "10"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited { provider: "pexels" });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: "pexels",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PexelsSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let assets = parsed
            .videos
            .into_iter()
            .filter_map(|video| {
                // Tallest portrait file that still fits the output frame
                let file = video
                    .video_files
                    .iter()
                    .filter(|f| f.height >= f.width && f.height >= 1080)
                    .min_by_key(|f| f.height)
                    .or_else(|| video.video_files.iter().max_by_key(|f| f.height))?;
                Some(StockAsset {
                    id: format!("pexels-{}", video.id),
                    url: Some(file.link.clone()),
                    provider: "pexels",
                    width: file.width,
                    height: file.height,
                    duration_s: video.duration,
                })
            })
            .collect();

        Ok(assets)
    }
}

#[async_trait]
impl StockProvider for PexelsProvider {
    fn name(&self) -> &'static str {
        "pexels"
    }

    async fn search(&self, keyword: &str) -> ProviderResult<Vec<StockAsset>> {
        let assets = self.search_raw(keyword).await?;
        debug!("Pexels returned {} assets for \"{keyword}\"", assets.len());
        Ok(assets)
    }

    async fn fallbacks(&self) -> ProviderResult<Vec<StockAsset>> {
        let mut out = Vec::new();
        for keyword in FALLBACK_KEYWORDS {
            match self.search_raw(keyword).await {
                Ok(assets) => out.extend(assets),
                Err(e) => warn!("Fallback search \"{keyword}\" failed: {e}"),
            }
        }
        if out.is_empty() {
            return Err(ProviderError::Parse(
                "All fallback searches returned nothing".to_string(),
            ));
        }
        Ok(out)
    }
}

/// Deterministic offline provider: a fixed pool of placeholder assets
/// per keyword.
#[derive(Debug, Clone, Default)]
pub struct MockStockProvider {
    /// Assets returned per keyword search
    pub per_keyword: usize,
}

impl MockStockProvider {
    pub fn new() -> Self {
        Self { per_keyword: 4 }
    }
}

#[async_trait]
impl StockProvider for MockStockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, keyword: &str) -> ProviderResult<Vec<StockAsset>> {
        let slug: String = keyword
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        Ok((0..self.per_keyword)
            .map(|i| StockAsset {
                id: format!("mock-{slug}-{i}"),
                url: None,
                provider: "mock",
                width: 1080,
                height: 1920,
                duration_s: 10.0,
            })
            .collect())
    }

    async fn fallbacks(&self) -> ProviderResult<Vec<StockAsset>> {
        Ok((0..6)
            .map(|i| StockAsset {
                id: format!("mock-fallback-{i}"),
                url: None,
                provider: "mock",
                width: 1080,
                height: 1920,
                duration_s: 10.0,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    videos: Vec<PexelsVideo>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideo {
    id: u64,
    duration: f64,
    video_files: Vec<PexelsVideoFile>,
}

#[derive(Debug, Deserialize)]
struct PexelsVideoFile {
    link: String,
    width: u32,
    height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_mock_provider_is_deterministic() {
        let provider = MockStockProvider::new();
        let first = provider.search("Coffee Beans").await.unwrap();
        let second = provider.search("Coffee Beans").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].id, "mock-coffee-beans-0");
        assert!(first[0].url.is_none());
    }

    #[tokio::test]
    async fn test_pexels_parse_picks_portrait_file() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "videos": [{
                "id": 42,
                "duration": 12.5,
                "video_files": [
                    {"link": "https://cdn/low.mp4", "width": 540, "height": 960},
                    {"link": "https://cdn/hd.mp4", "width": 1080, "height": 1920},
                    {"link": "https://cdn/wide.mp4", "width": 1920, "height": 1080}
                ]
            }]
        });
        Mock::given(method("GET"))
            .and(path("/videos/search"))
            .and(query_param("query", "coffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = PexelsProvider::new("test-key").with_base_url(server.uri());
        let assets = provider.search("coffee").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id, "pexels-42");
        assert_eq!(assets[0].url.as_deref(), Some("https://cdn/hd.mp4"));
        assert_eq!(assets[0].height, 1920);
    }

    #[tokio::test]
    async fn test_pexels_rate_limit_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = PexelsProvider::new("test-key").with_base_url(server.uri());
        let err = provider.search("coffee").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }
}
