//! HTTP client for the compute engine.

use tracing::{debug, info};

use gridrun_core::LaunchRequest;

use crate::error::ClientError;

/// Submits launch requests to the compute engine.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    inner: reqwest::Client,
    url: String,
}

impl ComputeClient {
    /// Create a client posting requests to `url`.
    pub fn new(url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Submit a request. Returns once the engine has accepted it.
    pub async fn run(&self, request: &LaunchRequest) -> Result<(), ClientError> {
        debug!(url = %self.url, task_id = %request.id, run_id = %request.run_id, "POST launch request");

        let response = self.inner.post(&self.url).json(request).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        info!(task_id = %request.id, run_id = %request.run_id, "Compute engine accepted run");
        Ok(())
    }
}
