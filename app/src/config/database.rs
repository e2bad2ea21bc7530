//! Database configuration
//!
//! The CLI data source: URL or individual parameters from the environment,
//! schema globs chosen by the compiled-in build mode.

use datasource::{ConnectionDescriptor, EnvSnapshot};

/// Resolve the data source used by the CLI commands
pub fn data_source(vars: &EnvSnapshot) -> ConnectionDescriptor {
    ConnectionDescriptor::from_env(vars)
}
