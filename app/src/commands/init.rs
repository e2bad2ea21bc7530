use std::path::Path;

use datasource::config::load_env_snapshot;
use datasource::{DataSource, SeaOrmConnector};

use crate::config::data_source;

/// Resolve the CLI data source and initialize it once
///
/// The outcome is only logged: a failed connection neither retries nor
/// changes the exit status.
pub async fn run(project_root: &Path) {
    let vars = load_env_snapshot(project_root);
    let source = DataSource::new(data_source(&vars));

    source.initialize_and_report(&SeaOrmConnector).await;
}
