//! # Fetch Command Implementation
//!
//! Downloads a store archive into its work directory and reports whether the
//! local copy changed, followed by a short summary of what is on disk.

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use walkdir::WalkDir;

use appstore_catalog::defaults::DEFAULT_FETCH_TIMEOUT_SECS;
use appstore_catalog::fetch::FetchOutcome;
use appstore_catalog::suggestions;

use super::StoreArgs;

/// Download a store and unpack it into its work directory
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Timeout in seconds for downloading the store archive.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Suppress the progress spinner.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `fetch` command.
pub fn execute(args: FetchArgs) -> Result<()> {
    let mut store = args.store.open(args.timeout)?;

    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching {}", store.url()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = store.fetch();
    spinner.finish_and_clear();

    let outcome = outcome.map_err(|e| suggestions::explain(e, store.url(), false))?;
    let status = match &outcome {
        FetchOutcome::Updated(_) => "updated",
        FetchOutcome::Unchanged(_) => "unchanged",
    };
    println!("{} {}", status, outcome.dir().display());

    if let Ok(store_root) = store.store_root() {
        println!("store root: {}", store_root.display());
    }
    let (files, bytes) = tree_size(outcome.dir());
    println!("{} files, {} bytes", files, bytes);

    Ok(())
}

/// File count and total size below `dir`.
fn tree_size(dir: &Path) -> (usize, u64) {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .fold((0, 0), |(files, bytes), entry| {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (files + 1, bytes + size)
        })
}
