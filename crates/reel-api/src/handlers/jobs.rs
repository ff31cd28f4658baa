//! Job creation and status handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use reel_models::{Job, JobId, JobRequest, Tone};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Longest accepted topic.
const MAX_TOPIC_CHARS: usize = 200;

/// Accepted duration range in seconds.
const MIN_DURATION_SECONDS: i64 = 20;
const MAX_DURATION_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub duration_seconds: Option<i64>,
    pub tone: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub job_id: JobId,
    pub status: String,
}

/// Validate the raw request into a typed job request.
fn validate(request: GenerateRequest) -> Result<JobRequest, ApiError> {
    let topic = request
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Topic is required"))?;
    if topic.chars().count() > MAX_TOPIC_CHARS {
        return Err(ApiError::bad_request(format!(
            "Topic must be at most {MAX_TOPIC_CHARS} characters"
        )));
    }

    let duration_seconds = request
        .duration_seconds
        .filter(|d| (MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(d))
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Duration must be between {MIN_DURATION_SECONDS} and {MAX_DURATION_SECONDS} seconds"
            ))
        })?;

    let tone = match request.tone.as_deref() {
        None => Tone::default(),
        Some(raw) => Tone::parse(raw).ok_or_else(|| {
            ApiError::bad_request(
                "Tone must be one of informative, dramatic, motivational, neutral",
            )
        })?,
    };

    Ok(JobRequest {
        topic: topic.to_string(),
        duration_seconds: duration_seconds as u32,
        tone,
        dry_run: request.dry_run,
    })
}

/// POST /api/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<(StatusCode, Json<GenerateResponse>)> {
    let request = validate(request)?;
    let job = state.store.create(request).await;
    info!(job_id = %job.id, topic = %job.topic, "Job accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            job_id: job.id,
            status: job.status.as_str().to_string(),
        }),
    ))
}

/// GET /api/status/:id
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    state
        .store
        .get(&JobId::from_string(id))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job not found"))
}

/// GET /api/jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.store.list().await)
}
