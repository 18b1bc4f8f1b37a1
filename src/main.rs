//! # App Store Catalog CLI
//!
//! This is the binary entry point for the `appstore-catalog` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Dispatching to the command implementations in `commands`.
//!
//! The store logic lives in the `appstore_catalog` library crate; the binary
//! only formats its results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
