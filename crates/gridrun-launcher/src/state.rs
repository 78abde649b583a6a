//! Shared application state.

use tokio::sync::mpsc;

use gridrun_core::Task;

use crate::service::ManualLauncher;

/// Shared application state.
pub struct AppState {
    /// Handles `/start/{timestamp}` requests.
    pub manual: ManualLauncher,

    /// Feeds the automatic launcher.
    pub notifications: mpsc::Sender<Task>,
}

impl AppState {
    pub fn new(manual: ManualLauncher, notifications: mpsc::Sender<Task>) -> Self {
        Self {
            manual,
            notifications,
        }
    }
}
