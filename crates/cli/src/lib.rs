pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cravey",
    about = "Cravey conversational interest engine CLI",
    long_about = "Drive a conversation against the demo catalog, inspect the \
effective engine configuration, and browse demo products.",
    after_help = "Examples:\n  cravey chat\n  cravey catalog --json\n  cravey config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with the engine over stdin against the demo catalog")]
    Chat {
        #[arg(long, help = "Path to a cravey.toml config file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Maximum recommendations to show per ranking pass")]
        limit: Option<usize>,
    },
    #[command(about = "List the demo catalog")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Load and validate the effective configuration")]
    Config {
        #[arg(long, help = "Path to a cravey.toml config file")]
        path: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { config, limit } => commands::chat::run(config, limit),
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Config { path } => commands::config::run(path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
