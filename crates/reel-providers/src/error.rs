//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429 from a provider; the caller rotates keys or backs off.
    #[error("Rate limited by {provider}")]
    RateLimited { provider: &'static str },

    /// Non-429 HTTP failure. 4xx is fatal, 5xx retryable.
    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Transport-level failure (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The oracle answered, but not with the structure we demanded.
    #[error("Failed to parse oracle response: {0}")]
    Parse(String),

    /// A provider was invoked without its credential.
    #[error("Missing API key: {0}")]
    MissingKey(&'static str),

    /// Speech synthesis failed.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// All retries and key rotations were exhausted.
    #[error("Oracle exhausted after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Whether a retry with backoff can help.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Http { status, .. } => *status >= 500,
            ProviderError::Network(_) => true,
            _ => false,
        }
    }

    /// Whether this is a hard client error (non-429 4xx).
    pub fn is_fatal_http(&self) -> bool {
        matches!(self, ProviderError::Http { status, .. } if (400..500).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(ProviderError::RateLimited { provider: "gemini" }.is_retryable());
        assert!(ProviderError::Http {
            provider: "gemini",
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!ProviderError::Http {
            provider: "gemini",
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!ProviderError::Parse("bad".into()).is_retryable());
    }

    #[test]
    fn test_fatal_http() {
        let err = ProviderError::Http {
            provider: "groq",
            status: 403,
            body: String::new(),
        };
        assert!(err.is_fatal_http());
        let err = ProviderError::Http {
            provider: "groq",
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_fatal_http());
    }
}
