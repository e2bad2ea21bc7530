//! Configuration module
//!
//! This module provides environment-driven configuration:
//! - `.env` file loading with environment-based precedence, into an owned
//!   [`EnvSnapshot`] instead of the process environment
//! - Type-safe configuration structs
//! - A [`ConfigService`] that can be registered in the [`Container`](crate::Container)
//!
//! # Example
//!
//! ```rust,no_run
//! use datasource::config::{load_env_snapshot, ConfigService};
//!
//! let config = ConfigService::new(load_env_snapshot(std::path::Path::new(".")));
//! let url: Option<String> = config.get("DATABASE_URL");
//! ```

pub mod env;
pub mod providers;

pub use env::{load_env_snapshot, load_env_snapshot_with, read_env_file, EnvSnapshot, Environment};
pub use providers::{AppConfig, AppConfigBuilder};

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Read access to the resolved environment
///
/// Cheap to clone; every clone shares the same snapshot.
#[derive(Debug, Clone)]
pub struct ConfigService {
    vars: Arc<EnvSnapshot>,
}

impl ConfigService {
    /// Wrap an already resolved snapshot
    pub fn new(vars: EnvSnapshot) -> Self {
        Self {
            vars: Arc::new(vars),
        }
    }

    /// Load `.env` files from `project_root` and overlay the process environment
    pub fn load(project_root: &Path) -> Self {
        Self::new(load_env_snapshot(project_root))
    }

    /// Get a variable parsed as `T`
    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        self.vars.optional(key)
    }

    /// Get a variable parsed as `T`, or `default`
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.vars.get(key, default)
    }

    /// The underlying snapshot
    pub fn snapshot(&self) -> &EnvSnapshot {
        &self.vars
    }

    /// The detected environment
    pub fn environment(&self) -> Environment {
        Environment::detect_from(&self.vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_service_reads_snapshot() {
        let config = ConfigService::new(EnvSnapshot::from_pairs([
            ("DATABASE_URL", "postgres://u:p@h/db"),
            ("APP_ENV", "staging"),
        ]));

        assert_eq!(
            config.get::<String>("DATABASE_URL").as_deref(),
            Some("postgres://u:p@h/db")
        );
        assert_eq!(config.get_or("DB_PORT", 52674u16), 52674);
        assert_eq!(config.environment(), Environment::Staging);
    }
}
