//! GridRun Launcher Library
//!
//! Resolves the input files of a time-stamped task from its reference
//! document, records the run with the task manager and hands the run to the
//! compute engine.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod mapper;
pub mod ports;
pub mod reference;
pub mod resolver;
pub mod service;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::{Config, StorageConfig};
pub use context::{LaunchContext, LaunchMode};
pub use error::{FetchError, ImportError, LaunchError, StorageError};
pub use gate::{LaunchGate, LaunchPermit};
pub use service::{AutoLauncher, LaunchOutcome, LaunchService, ManualLauncher};
pub use state::AppState;
