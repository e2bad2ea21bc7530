use console::style;
use serde_json::json;
use std::path::Path;

use datasource::config::load_env_snapshot;
use datasource::{AppConfig, ConnectionDescriptor};

use crate::config::data_source;

pub fn run(project_root: &Path) {
    let vars = load_env_snapshot(project_root);
    let app = AppConfig::from_env(&vars);
    let descriptor = data_source(&vars);

    match render(&app, &descriptor) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Pretty JSON for a descriptor, passwords masked
fn render(app: &AppConfig, descriptor: &ConnectionDescriptor) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "app": app.name,
        "environment": app.environment.to_string(),
        "build_mode": app.build_mode,
        "data_source": descriptor.redacted(),
    }))
}
