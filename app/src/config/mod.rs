mod database;

pub use database::data_source;

use std::path::Path;

use datasource::{AppConfig, ConfigService, Container};

/// Load the environment and register all application configs
pub fn register_all(container: &mut Container, project_root: &Path) {
    let config = ConfigService::load(project_root);
    container.singleton(AppConfig::from_env(config.snapshot()));
    container.singleton(config);
}
