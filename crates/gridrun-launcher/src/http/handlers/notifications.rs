//! Task update notification handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use gridrun_core::Task;

use crate::state::AppState;

/// Queue a task update for the automatic launcher.
pub async fn task_updated(State(state): State<Arc<AppState>>, Json(task): Json<Task>) -> StatusCode {
    debug!(timestamp = %task.timestamp, status = %task.status, "Task update received");

    match state.notifications.send(task).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            error!("Automatic launcher stopped, dropping task update");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
