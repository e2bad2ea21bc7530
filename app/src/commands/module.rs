use console::style;
use std::path::Path;

use datasource::{ConfigService, DbConnection};

use crate::bootstrap;

pub async fn run(project_root: &Path) {
    let container = match bootstrap::register(project_root).await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let environment = container
        .get::<ConfigService>()
        .map(|config| config.environment().to_string())
        .unwrap_or_default();

    println!(
        "{} Database module ready ({} services registered, environment: {})",
        style("->").cyan(),
        container.len(),
        style(environment).bold()
    );

    if !container.has::<DbConnection>() {
        eprintln!("{} No database connection registered", style("Warning:").yellow().bold());
    }
}
