//! Huddle CLI
//!
//! Drives the chat app's route tree and notification collection from the
//! command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use huddle_core::logging_facility;
use huddle_core::HuddleConfig;

mod chat;
mod commands;

#[derive(Debug, Parser)]
#[command(name = "huddle")]
#[command(about = "Huddle - chat navigation and notifications", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a path through the chat routes and print the models
    Navigate(commands::navigate::NavigateArgs),
    /// Show a notification until it is evicted
    Notify(commands::notify::NotifyArgs),
    /// List the chat route patterns
    Routes,
}

fn load_config(path: Option<&PathBuf>) -> Result<HuddleConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => HuddleConfig::load(path)?,
        None => HuddleConfig::default(),
    };
    logging_facility::init(config.logging.profile()?);
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match load_config(cli.config.as_ref()) {
        Ok(config) => match cli.command {
            Commands::Navigate(args) => commands::navigate::execute(args, &config).await,
            Commands::Notify(args) => commands::notify::execute(args, &config).await,
            Commands::Routes => commands::routes::execute(),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
