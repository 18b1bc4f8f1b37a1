//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// App Store Catalog - Mirror app stores and browse their applications
#[derive(Parser, Debug)]
#[command(name = "appstore-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (off, error, warn, info, debug, trace). RUST_LOG takes
    /// precedence when set.
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the local work directory of a store URL
    Workdir(commands::workdir::WorkdirArgs),

    /// Download a store and unpack it into its work directory
    Fetch(commands::fetch::FetchArgs),

    /// List the apps of a store
    Ls(commands::ls::LsArgs),

    /// Show the store listing of one app
    Info(commands::info::InfoArgs),

    /// Print the recommended app ids of a store
    Recommend(commands::recommend::RecommendArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Workdir(args) => commands::workdir::execute(args),
            Commands::Fetch(args) => commands::fetch::execute(args),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Info(args) => commands::info::execute(args),
            Commands::Recommend(args) => commands::recommend::execute(args),
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded; keep the existing one.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
