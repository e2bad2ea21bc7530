//! Environment-driven database connection descriptors
//!
//! Reads `.env` files and the process environment into an owned snapshot,
//! resolves a [`ConnectionDescriptor`] from it and hands that descriptor to
//! SeaORM once.

pub mod config;
pub mod container;
pub mod database;
pub mod error;
pub mod logging;

pub use config::{AppConfig, ConfigService, EnvSnapshot, Environment};
pub use container::Container;
pub use database::{
    BuildMode, ConnectionDescriptor, DataSource, DatabaseModule, DbConnection, InitOutcome,
    SeaOrmConnector,
};
pub use error::FrameworkError;

// Re-export sea_orm types that users commonly need
pub use sea_orm;
