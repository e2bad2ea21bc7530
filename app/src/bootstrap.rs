//! Application Bootstrap
//!
//! Builds the service container: configs first, then the database module
//! that resolves them.

use std::path::Path;

use datasource::{Container, DatabaseModule, FrameworkError, SeaOrmConnector};

use crate::config;

/// Register configs and the database module
pub async fn register(project_root: &Path) -> Result<Container, FrameworkError> {
    let mut container = Container::new();
    config::register_all(&mut container, project_root);

    DatabaseModule::for_root_async(&mut container, &SeaOrmConnector, DatabaseModule::url_factory)
        .await?;

    Ok(container)
}
