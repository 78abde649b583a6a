//! HTTP request and response types.

use serde::Serialize;

use crate::service::LaunchOutcome;

/// Response body of the start endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResponse {
    /// `dispatched`, `aborted`, `not_ready` or `already_launched`.
    pub outcome: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl From<LaunchOutcome> for LaunchResponse {
    fn from(outcome: LaunchOutcome) -> Self {
        match outcome {
            LaunchOutcome::Dispatched { run_id } => Self {
                outcome: "dispatched",
                run_id: Some(run_id.to_string()),
            },
            LaunchOutcome::Aborted => Self {
                outcome: "aborted",
                run_id: None,
            },
            LaunchOutcome::NotReady => Self {
                outcome: "not_ready",
                run_id: None,
            },
            LaunchOutcome::AlreadyLaunched => Self {
                outcome: "already_launched",
                run_id: None,
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
