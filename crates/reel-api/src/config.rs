//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Root for generated files served statically
    pub data_dir: PathBuf,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            data_dir: PathBuf::from("."),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5001),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Static root for /assets.
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    /// Static root for /output.
    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    /// Static root for /cache.
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache_render")
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 5001);
        assert!(!config.is_production());
    }

    #[test]
    fn test_static_roots() {
        let config = ApiConfig {
            data_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(config.assets_dir(), PathBuf::from("/data/assets"));
        assert_eq!(config.cache_dir(), PathBuf::from("/data/cache_render"));
    }
}
