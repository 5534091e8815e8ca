//! Schema module - Configuration and run statistics for hill-climbing runs.

mod config;
mod progress;

pub use config::*;
pub use progress::*;
