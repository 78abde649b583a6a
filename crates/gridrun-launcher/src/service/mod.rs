//! Launch services.

mod auto;
mod launch;
mod manual;

pub use auto::AutoLauncher;
pub use launch::{LaunchOutcome, LaunchService, EVENTS};
pub use manual::ManualLauncher;
