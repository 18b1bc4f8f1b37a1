//! # Workdir Command Implementation
//!
//! Prints the local work directory a store URL maps to. Nothing is fetched
//! and nothing is created; the path may not exist yet.

use anyhow::Result;
use clap::Args;

use appstore_catalog::path::compute_work_dir;
use appstore_catalog::suggestions;

use super::StoreArgs;

/// Print the local work directory of a store URL
#[derive(Args, Debug)]
pub struct WorkdirArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute the `workdir` command.
pub fn execute(args: WorkdirArgs) -> Result<()> {
    let work_dir = compute_work_dir(&args.store.base_path(), &args.store.url)
        .map_err(|e| suggestions::explain(e, &args.store.url, false))?;
    println!("{}", work_dir.display());
    Ok(())
}
