//! Mark handlers: retention protection for job files.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct MarkResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct IsMarkedResponse {
    #[serde(rename = "isMarked")]
    pub is_marked: bool,
}

/// POST /api/mark/:id
pub async fn mark_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<MarkResponse> {
    let success = match state.marks.mark(&id).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to mark job {id}: {e}");
            false
        }
    };
    Json(MarkResponse { success })
}

/// POST /api/unmark/:id
pub async fn unmark_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<MarkResponse> {
    let success = match state.marks.unmark(&id).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to unmark job {id}: {e}");
            false
        }
    };
    Json(MarkResponse { success })
}

/// GET /api/is-marked/:id
pub async fn is_marked(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<IsMarkedResponse> {
    Json(IsMarkedResponse {
        is_marked: state.marks.is_marked(&id).await,
    })
}
