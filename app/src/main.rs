mod bootstrap;
mod commands;
mod config;

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datasource-cli")]
#[command(about = "Resolve and initialize the application's database connection", long_about = None)]
struct Cli {
    /// Directory containing the .env files
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved connection descriptor with secrets masked
    Show,
    /// Initialize the data source once and log the outcome
    Init,
    /// Wire the database module into the service container
    Module,
}

#[tokio::main]
async fn main() {
    if let Err(e) = datasource::logging::init("info") {
        eprintln!("{} {}", style("Warning:").yellow().bold(), e);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Show => commands::show::run(&cli.project_root),
        Commands::Init => commands::init::run(&cli.project_root).await,
        Commands::Module => commands::module::run(&cli.project_root).await,
    }
}
