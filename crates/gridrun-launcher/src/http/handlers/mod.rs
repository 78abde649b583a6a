//! HTTP request handlers.

mod health;
mod launch;
mod notifications;

pub use health::health_check;
pub use launch::start_task;
pub use notifications::task_updated;
