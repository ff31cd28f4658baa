//! Speech synthesis chain.
//!
//! Narration audio is cosmetic relative to the deterministic timing
//! model, so synthesis degrades gracefully: a premium streaming voice
//! when a key is configured, a local command-line synthesizer when
//! one is on PATH, and a silent WAV of exactly the modeled duration
//! as the floor.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use reel_media::write_silent_wav;

use crate::error::{ProviderError, ProviderResult};

/// Default ElevenLabs voice.
const ELEVENLABS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Capability interface for speech synthesis.
///
/// `out_base` is the destination path without extension; the
/// implementation picks the container and returns the real path.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        duration_ms: u64,
        out_base: &Path,
    ) -> ProviderResult<PathBuf>;
}

/// Production synthesis chain.
pub struct SpeechEngine {
    elevenlabs_key: Option<String>,
    local_synth: Option<PathBuf>,
    client: Client,
    elevenlabs_base_url: String,
}

impl SpeechEngine {
    /// Build the chain from the environment: ElevenLabs key, then a
    /// local `espeak` binary, then silence.
    pub fn from_env() -> Self {
        let local_synth = which::which("espeak").ok();
        if let Some(path) = &local_synth {
            debug!("Local synthesizer available at {}", path.display());
        }
        Self {
            elevenlabs_key: std::env::var("ELEVENLABS_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            local_synth,
            client: Client::new(),
            elevenlabs_base_url: "https://api.elevenlabs.io".to_string(),
        }
    }

    /// A chain that always writes silence. Used by tests and dry
    /// deployments.
    pub fn silent() -> Self {
        Self {
            elevenlabs_key: None,
            local_synth: None,
            client: Client::new(),
            elevenlabs_base_url: "https://api.elevenlabs.io".to_string(),
        }
    }

    async fn synthesize_elevenlabs(
        &self,
        key: &str,
        text: &str,
        out_path: &Path,
    ) -> ProviderResult<()> {
        let url = format!(
            "{}/v1/text-to-speech/{ELEVENLABS_VOICE_ID}",
            self.elevenlabs_base_url
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": "eleven_turbo_v2",
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                provider: "elevenlabs",
                status: status.as_u16(),
                body,
            });
        }

        // Stream the MP3 straight to disk
        let mut file = tokio::fs::File::create(out_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ProviderError::Network)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }

    async fn synthesize_local(
        &self,
        binary: &Path,
        text: &str,
        out_path: &Path,
    ) -> ProviderResult<()> {
        let output = Command::new(binary)
            .arg("-w")
            .arg(out_path)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Synthesis(format!(
                "Local synthesizer failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }
        if !out_path.exists() {
            return Err(ProviderError::Synthesis(
                "Local synthesizer produced no output".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechEngine {
    async fn synthesize(
        &self,
        text: &str,
        duration_ms: u64,
        out_base: &Path,
    ) -> ProviderResult<PathBuf> {
        if let Some(key) = &self.elevenlabs_key {
            let out_path = out_base.with_extension("mp3");
            match self.synthesize_elevenlabs(key, text, &out_path).await {
                Ok(()) => {
                    info!("Synthesized narration to {}", out_path.display());
                    return Ok(out_path);
                }
                Err(e) => warn!("Premium synthesis failed, falling back: {e}"),
            }
        }

        if let Some(binary) = &self.local_synth {
            let out_path = out_base.with_extension("wav");
            match self.synthesize_local(binary, text, &out_path).await {
                Ok(()) => {
                    info!("Synthesized narration locally to {}", out_path.display());
                    return Ok(out_path);
                }
                Err(e) => warn!("Local synthesis failed, falling back: {e}"),
            }
        }

        let out_path = out_base.with_extension("wav");
        write_silent_wav(&out_path, duration_ms)?;
        debug!(
            "Wrote {}ms of silence to {}",
            duration_ms,
            out_path.display()
        );
        Ok(out_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silent_chain_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("scene_0");
        let engine = SpeechEngine::silent();
        let path = engine.synthesize("hello world", 2000, &base).await.unwrap();

        assert_eq!(path.extension().unwrap(), "wav");
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 2000 * 16);
    }
}
