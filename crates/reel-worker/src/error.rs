//! Worker error taxonomy.
//!
//! Every pipeline failure funnels into one of these variants; the
//! executor converts the variant into the classified `JobFailure`
//! surfaced to clients.

use thiserror::Error;

use reel_media::{MediaError, RenderErrorKind};
use reel_models::JobFailure;
use reel_providers::ProviderError;
use reel_timeline::EditPlanError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Hard oracle failure: non-429 4xx, or retries exhausted with no
    /// fallback permitted.
    #[error("Oracle failed: {0}")]
    OracleFatal(String),

    /// The oracle answered with something that isn't a script.
    #[error("Oracle response unparseable: {0}")]
    ParseError(String),

    /// A validation gate rejected a stage output past its retry budget.
    #[error("{stage} gate rejected output: {}", .errors.join("; "))]
    GateReject {
        stage: &'static str,
        errors: Vec<String>,
    },

    /// Every fallback layer came up empty with reuse disabled.
    #[error("Asset supply exhausted: {0}")]
    AssetShortage(String),

    /// Edit plan construction hit a fatal condition.
    #[error("Edit plan failed: {0}")]
    EditPlan(#[from] EditPlanError),

    /// FFmpeg failed; classified from its stderr.
    #[error("Render failed ({kind}): {message}")]
    RenderFailure {
        kind: RenderErrorKind,
        message: String,
        stderr: Option<String>,
    },

    /// The final auditor issued a NO-GO.
    #[error("Audit rejected video: {0}")]
    AuditNoGo(String),

    /// A pipeline task panicked or was torn down.
    #[error("Internal failure: {0}")]
    Internal(String),

    #[error("Asset error: {0}")]
    Asset(#[from] reel_assets::AssetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Wrap a renderer failure with its classification.
    pub fn render(err: MediaError) -> Self {
        let kind = err.render_kind();
        let stderr = err.stderr().map(|s| s.to_string());
        Self::RenderFailure {
            kind,
            message: err.to_string(),
            stderr,
        }
    }

    /// Map an oracle-layer error into the worker taxonomy.
    pub fn from_oracle(err: ProviderError) -> Self {
        match err {
            ProviderError::Parse(msg) => Self::ParseError(msg),
            other => Self::OracleFatal(other.to_string()),
        }
    }

    /// Stable classification string for the job record.
    pub fn error_type(&self) -> String {
        match self {
            WorkerError::OracleFatal(_) => "oracle_fatal".to_string(),
            WorkerError::ParseError(_) => "parse_error".to_string(),
            WorkerError::GateReject { stage, .. } => format!("gate_reject:{stage}"),
            WorkerError::AssetShortage(_) => "asset_shortage".to_string(),
            WorkerError::EditPlan(_) => "gate_reject:edit_plan".to_string(),
            WorkerError::RenderFailure { kind, .. } => format!("render_failure:{kind}"),
            WorkerError::AuditNoGo(_) => "audit_nogo".to_string(),
            WorkerError::Internal(_) => "internal".to_string(),
            WorkerError::Asset(_) => "asset_error".to_string(),
            WorkerError::Io(_) => "io_error".to_string(),
        }
    }

    /// Convert into the failure record published on the job.
    pub fn into_failure(self) -> JobFailure {
        let error_type = self.error_type();
        let diagnostics = match &self {
            WorkerError::GateReject { errors, .. } => errors.clone(),
            WorkerError::RenderFailure { stderr, .. } => stderr
                .as_deref()
                .map(|s| s.lines().rev().take(20).map(String::from).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        JobFailure::new(self.to_string(), error_type).with_diagnostics(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = WorkerError::GateReject {
            stage: "script",
            errors: vec!["hook too long".to_string()],
        };
        assert_eq!(err.error_type(), "gate_reject:script");

        let failure = err.into_failure();
        assert_eq!(failure.diagnostics, vec!["hook too long"]);
    }

    #[test]
    fn test_render_classification_carries_through() {
        let media = MediaError::ffmpeg_failed(
            "boom",
            Some("clip.mp4: No such file or directory".to_string()),
            Some(1),
        );
        let err = WorkerError::render(media);
        assert_eq!(err.error_type(), "render_failure:asset_missing");
    }

    #[test]
    fn test_oracle_parse_maps_to_parse_error() {
        let err = WorkerError::from_oracle(ProviderError::Parse("bad json".to_string()));
        assert_eq!(err.error_type(), "parse_error");
    }
}
