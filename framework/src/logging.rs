//! Log subscriber setup
//!
//! Everything is written to stderr so stdout stays clean for command output.

use tracing_subscriber::EnvFilter;

use crate::error::FrameworkError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_level` when set.
pub fn init(default_level: &str) -> Result<(), FrameworkError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| FrameworkError::internal(format!("failed to initialize logging: {}", e)))
}
