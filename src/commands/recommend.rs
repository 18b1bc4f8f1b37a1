//! # Recommend Command Implementation
//!
//! Prints the store's recommended app ids in list order, one per line. A
//! store without a recommend list prints nothing.

use anyhow::Result;
use clap::Args;

use appstore_catalog::suggestions;

use super::{CatalogArgs, StoreArgs};

/// Print the recommended app ids of a store
#[derive(Args, Debug)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Execute the `recommend` command.
pub fn execute(args: RecommendArgs) -> Result<()> {
    let mut store = args.store.open(args.catalog.timeout)?;
    let offline = args.catalog.offline;

    if !offline {
        store
            .fetch()
            .map_err(|e| suggestions::explain(e, &args.store.url, offline))?;
    }

    let recommended = store
        .recommend()
        .map_err(|e| suggestions::explain(e, &args.store.url, offline))?;
    for app_id in recommended {
        println!("{}", app_id);
    }

    Ok(())
}
