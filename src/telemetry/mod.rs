//! Telemetry module
//!
//! Logging and counters

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{increment_counter, Counter};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level)?;
    Ok(())
}
