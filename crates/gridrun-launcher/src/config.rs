//! Launcher configuration.

/// Launcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_addr: String,

    /// Task manager URL prefix; the timestamp is appended to it.
    pub task_manager_timestamp_url: String,

    /// File types whose arrival triggers an automatic launch. Empty means
    /// every ready task is launched.
    pub auto_trigger_filetypes: Vec<String>,

    /// URL prefixes documents may be downloaded from.
    pub whitelist: Vec<String>,

    /// Compute engine run endpoint.
    pub compute_url: String,

    /// Status update endpoint.
    pub status_update_url: String,

    /// Object storage holding the input files.
    pub storage: StorageConfig,

    /// Lifetime of the download URLs handed to the compute engine (hours).
    pub presigned_url_expiry_hours: u32,

    /// Capacity of the task update channel.
    pub notification_buffer: usize,
}

/// Object storage connection settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL, e.g. `http://minio:9000`.
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            task_manager_timestamp_url: "http://localhost:8081/tasks/".to_string(),
            auto_trigger_filetypes: Vec::new(),
            whitelist: vec!["http://localhost:9000".to_string()],
            compute_url: "http://localhost:8082/run".to_string(),
            status_update_url: "http://localhost:8081/tasks/status-update".to_string(),
            storage: StorageConfig::default(),
            presigned_url_expiry_hours: 1,
            notification_buffer: 64,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            access_key: "gridrun".to_string(),
            secret_key: "gridrun".to_string(),
        }
    }
}
