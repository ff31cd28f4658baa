//! Script oracle: the language-model collaborator.
//!
//! The oracle is asked for strict JSON matching the 7-scene script
//! shape. A fast primary endpoint (Groq) is tried first when a key is
//! configured; the Gemini pool is the fallback, with key rotation on
//! 429, exponential backoff with jitter on transient failures, and a
//! process-wide minimum interval between calls. When everything is
//! down and the caller permits it, a deterministic canned skeleton
//! keeps the pipeline alive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use reel_models::{Scene, SceneKind, Script, Tone};

use crate::error::{ProviderError, ProviderResult};

/// Secondary oracle model.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Primary (fast) oracle model.
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Capability interface for script generation.
#[async_trait]
pub trait ScriptOracle: Send + Sync {
    async fn generate_script(
        &self,
        topic: &str,
        duration_seconds: u32,
        tone: Tone,
    ) -> ProviderResult<Script>;
}

/// Oracle configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Gemini key pool, rotated on 429
    pub gemini_keys: Vec<String>,
    pub gemini_enabled: bool,
    /// Primary fast oracle key
    pub groq_key: Option<String>,
    /// Minimum interval between any two oracle calls
    pub min_interval: Duration,
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Return the canned skeleton instead of failing on transport errors
    pub allow_fallback_script: bool,
    pub gemini_base_url: String,
    pub groq_base_url: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            gemini_keys: Vec::new(),
            gemini_enabled: true,
            groq_key: None,
            min_interval: Duration::from_millis(1000),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            allow_fallback_script: true,
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            groq_base_url: "https://api.groq.com".to_string(),
        }
    }
}

impl OracleConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut gemini_keys = Vec::new();
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                gemini_keys.push(key);
            }
        }
        for n in 2..=5 {
            if let Ok(key) = std::env::var(format!("GEMINI_API_KEY_{n}")) {
                if !key.is_empty() {
                    gemini_keys.push(key);
                }
            }
        }

        Self {
            gemini_keys,
            gemini_enabled: std::env::var("GEMINI_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            groq_key: std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            min_interval: Duration::from_millis(
                std::env::var("GEMINI_MIN_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
            ..Default::default()
        }
    }
}

/// Production oracle adapter.
pub struct LlmOracle {
    config: OracleConfig,
    client: Client,
    key_index: AtomicUsize,
    /// Process-wide pacing state
    last_call: Mutex<Option<Instant>>,
}

impl LlmOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            key_index: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OracleConfig::from_env())
    }

    /// Sleep until at least `min_interval` has passed since the last
    /// oracle call, then claim this slot.
    async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.config.min_interval {
                tokio::time::sleep(self.config.min_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=500));
        self.config.base_delay.saturating_mul(2u32.pow(attempt)) + jitter
    }

    /// Gemini attempt loop: rotate keys on 429, back off on transient
    /// failures, bail immediately on hard client errors.
    async fn generate_via_gemini(&self, prompt: &str) -> ProviderResult<Script> {
        let keys = &self.config.gemini_keys;
        let mut attempt = 0u32;
        let mut rotations_in_cycle = 0usize;

        loop {
            let key = &keys[self.key_index.load(Ordering::Relaxed) % keys.len()];
            match self.call_gemini(key, prompt).await {
                Ok(script) => return Ok(script),
                Err(e @ ProviderError::RateLimited { .. }) => {
                    self.key_index.fetch_add(1, Ordering::Relaxed);
                    rotations_in_cycle += 1;
                    if rotations_in_cycle < keys.len() {
                        debug!("Rate limited, rotating to next key");
                        continue;
                    }
                    // Whole pool throttled; this cycle counts as one attempt
                    rotations_in_cycle = 0;
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        return Err(ProviderError::Exhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    tokio::time::sleep(self.backoff_delay(attempt - 1)).await;
                }
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        return Err(ProviderError::Exhausted {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    let delay = self.backoff_delay(attempt - 1);
                    warn!("Oracle attempt {attempt} failed, retrying in {delay:?}: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_gemini(&self, key: &str, prompt: &str) -> ProviderResult<Script> {
        self.throttle().await;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.gemini_base_url, GEMINI_MODEL
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited { provider: "gemini" });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: "gemini",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| ProviderError::Parse("No content in oracle response".to_string()))?;

        parse_script(text)
    }

    async fn call_groq(&self, key: &str, prompt: &str) -> ProviderResult<Script> {
        self.throttle().await;

        let url = format!("{}/openai/v1/chat/completions", self.config.groq_base_url);
        let request = GroqRequest {
            model: GROQ_MODEL.to_string(),
            messages: vec![GroqMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            response_format: GroqResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: 0.8,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited { provider: "groq" });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: "groq",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GroqResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let text = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ProviderError::Parse("No choices in oracle response".to_string()))?;

        parse_script(text)
    }
}

#[async_trait]
impl ScriptOracle for LlmOracle {
    async fn generate_script(
        &self,
        topic: &str,
        duration_seconds: u32,
        tone: Tone,
    ) -> ProviderResult<Script> {
        let prompt = build_prompt(topic, duration_seconds, tone);

        // Primary fast oracle first
        if let Some(groq_key) = self.config.groq_key.clone() {
            match self.call_groq(&groq_key, &prompt).await {
                Ok(script) => {
                    info!("Script generated by primary oracle");
                    return Ok(script);
                }
                Err(e) => warn!("Primary oracle failed, trying secondary: {e}"),
            }
        }

        let result = if self.config.gemini_enabled && !self.config.gemini_keys.is_empty() {
            self.generate_via_gemini(&prompt).await
        } else {
            Err(ProviderError::MissingKey("GEMINI_API_KEY"))
        };

        match result {
            Ok(script) => Ok(script),
            // Hard client errors and malformed answers never fall back
            Err(e) if e.is_fatal_http() || matches!(e, ProviderError::Parse(_)) => Err(e),
            Err(e) if self.config.allow_fallback_script => {
                warn!("Oracle unavailable, using canned script: {e}");
                Ok(fallback_script(topic))
            }
            Err(e) => Err(e),
        }
    }
}

/// Test/offline oracle returning a fixed script.
pub struct MockOracle {
    script: Script,
}

impl MockOracle {
    pub fn new(script: Script) -> Self {
        Self { script }
    }

    /// A mock seeded with the canned skeleton for a topic.
    pub fn canned(topic: &str) -> Self {
        Self::new(fallback_script(topic))
    }
}

#[async_trait]
impl ScriptOracle for MockOracle {
    async fn generate_script(
        &self,
        _topic: &str,
        _duration_seconds: u32,
        _tone: Tone,
    ) -> ProviderResult<Script> {
        Ok(self.script.clone())
    }
}

/// Parse the oracle's answer, tolerating markdown fences.
pub fn parse_script(text: &str) -> ProviderResult<Script> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    serde_json::from_str::<Script>(text.trim()).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Deterministic 7-scene skeleton built from the topic string.
///
/// Shaped to clear the script gate (curiosity hook, short ending) so
/// an oracle outage degrades quality, not availability.
pub fn fallback_script(topic: &str) -> Script {
    let short: Vec<&str> = topic.split_whitespace().take(3).collect();
    let short = if short.is_empty() {
        "this".to_string()
    } else {
        short.join(" ")
    };

    let keyword: String = topic
        .split_whitespace()
        .next()
        .unwrap_or("abstract")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    let keyword = if keyword.is_empty() {
        "abstract".to_string()
    } else {
        keyword
    };

    let texts = [
        format!("Most people think {short} is simple, but that hides everything"),
        format!("The usual advice about {short} skips the hard part"),
        "The real mechanism is smaller than you expect".to_string(),
        "The truth is the basics do most of the work".to_string(),
        "Everyone copies tactics instead of fixing the problem".to_string(),
        "Small consistent reps beat clever shortcuts every time".to_string(),
        format!("Now test {short} yourself"),
    ];
    let seconds = ["spotlight", "hands", "desk", "paper", "street", "screen", "window"];

    let scenes = SceneKind::ORDERED
        .iter()
        .zip(texts)
        .zip(seconds)
        .map(|((kind, text), second)| {
            Scene::new(*kind, text, vec![keyword.clone(), second.to_string()])
        })
        .collect();

    Script::new(scenes)
}

/// Prompt demanding strict JSON in the script shape.
fn build_prompt(topic: &str, duration_seconds: u32, tone: Tone) -> String {
    format!(
        r#"Write the narration script for a {duration_seconds}-second vertical short-form video about: {topic}

Tone: {tone}.

Return ONLY a single JSON object with this exact schema, no prose:
{{
  "scenes": [
    {{"type": "hook", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "body_1", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "body_2", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "body_3", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "body_4", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "body_5", "text": "...", "keywords": ["...", "..."]}},
    {{"type": "ending", "text": "...", "keywords": ["...", "..."]}}
  ]
}}

Rules:
- Exactly 7 scenes in the order above.
- The hook is at most 12 words and must open a curiosity gap, e.g.
  "Most people think X, but Y", "Nobody tells you this about X",
  "This sounds wrong, but X", or "X isn't the problem. Y is."
- Never open with "did you know", "in this video", "let's talk about"
  or "you won't believe".
- The ending is at most 8 words and must stop abruptly. No sign-offs,
  no "thank you", no summaries.
- Take a stance somewhere in the body; name what people get wrong.
- keywords: 2-3 concrete lower-case nouns or actions per scene,
  suitable for stock footage search. No abstract words.
- Body scenes are one or two punchy sentences each."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn script_json() -> String {
        serde_json::to_string(&fallback_script("The Science of Caffeine")).unwrap()
    }

    fn gemini_body(script_json: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": script_json}]}
            }]
        })
    }

    fn test_config(server_uri: &str, keys: Vec<String>) -> OracleConfig {
        OracleConfig {
            gemini_keys: keys,
            gemini_enabled: true,
            groq_key: None,
            min_interval: Duration::ZERO,
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            allow_fallback_script: false,
            gemini_base_url: server_uri.to_string(),
            groq_base_url: server_uri.to_string(),
        }
    }

    #[test]
    fn test_fallback_script_clears_the_gate() {
        let script = fallback_script("The Science of Caffeine");
        let report = reel_timeline::validate_script(&script);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_fallback_script_with_empty_topic() {
        let script = fallback_script("");
        assert_eq!(script.scenes.len(), 7);
        assert!(reel_timeline::validate_script(&script).is_valid());
    }

    #[test]
    fn test_parse_script_strips_fences() {
        let raw = format!("```json\n{}\n```", script_json());
        let script = parse_script(&raw).unwrap();
        assert_eq!(script.scenes.len(), 7);
    }

    #[test]
    fn test_parse_script_rejects_garbage() {
        let err = parse_script("not even json").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_rotates_keys() {
        let server = MockServer::start().await;
        let gemini_path = format!("/v1beta/models/{GEMINI_MODEL}:generateContent");

        Mock::given(method("POST"))
            .and(path(gemini_path.clone()))
            .and(query_param("key", "k1"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(gemini_path))
            .and(query_param("key", "k2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(&script_json())))
            .mount(&server)
            .await;

        let oracle = LlmOracle::new(test_config(
            &server.uri(),
            vec!["k1".to_string(), "k2".to_string()],
        ));
        let script = oracle
            .generate_script("The Science of Caffeine", 30, Tone::Informative)
            .await
            .unwrap();
        assert_eq!(script.scenes.len(), 7);
    }

    #[tokio::test]
    async fn test_client_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri(), vec!["k1".to_string()]);
        config.allow_fallback_script = true;
        let oracle = LlmOracle::new(config);
        let err = oracle
            .generate_script("Coffee", 30, Tone::Neutral)
            .await
            .unwrap_err();
        assert!(err.is_fatal_http());
    }

    #[tokio::test]
    async fn test_server_errors_fall_back_to_canned_script() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri(), vec!["k1".to_string()]);
        config.allow_fallback_script = true;
        let oracle = LlmOracle::new(config);
        let script = oracle
            .generate_script("Coffee", 30, Tone::Neutral)
            .await
            .unwrap();
        assert_eq!(script.scenes.len(), 7);
    }

    #[tokio::test]
    async fn test_primary_oracle_wins() {
        let server = MockServer::start().await;
        let groq_body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": script_json()}}]
        });
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(groq_body))
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri(), vec![]);
        config.groq_key = Some("gk".to_string());
        let oracle = LlmOracle::new(config);
        let script = oracle
            .generate_script("Coffee", 30, Tone::Dramatic)
            .await
            .unwrap();
        assert_eq!(script.scenes.len(), 7);
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    response_format: GroqResponseFormat,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct GroqResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqMessage,
}
