//! Manual launch handler.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::{error, warn};

use gridrun_core::TaskParameter;

use crate::error::LaunchError;
use crate::http::responses::{ErrorResponse, LaunchResponse};
use crate::state::AppState;

/// Launch the task at `timestamp`.
///
/// An optional JSON list of parameters overrides the task's own.
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Path(timestamp): Path<String>,
    parameters: Option<Json<Vec<TaskParameter>>>,
) -> impl IntoResponse {
    let parameters = parameters.map(|Json(p)| p).unwrap_or_default();

    match state.manual.launch_job(&timestamp, parameters).await {
        Ok(outcome) => (StatusCode::OK, Json(LaunchResponse::from(outcome))).into_response(),
        Err(e) => {
            let status = match &e {
                LaunchError::TaskNotFound(_) => StatusCode::NOT_FOUND,
                e if e.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                error!(timestamp = %timestamp, error = %e, "Launch failed");
            } else {
                warn!(timestamp = %timestamp, error = %e, "Launch rejected");
            }

            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}
