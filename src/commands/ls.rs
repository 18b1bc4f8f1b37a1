//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists the apps of a store.
//!
//! ## Functionality
//!
//! - **App Listing**: One line per app with its id, category and title
//! - **Category Summary**: `--categories` prints app counts per category
//! - **JSON Output**: `--json` prints the store listings keyed by app id
//! - **Skipped Packages**: `--verbose` reports packages left out of the catalog
//!
//! By default the store is fetched first; `--offline` lists the copy on disk.

use anyhow::Result;
use clap::Args;
use std::collections::BTreeMap;

use appstore_catalog::catalog::{categories, Catalog};
use appstore_catalog::compose::{StoreInfo, DEFAULT_LOCALE};

use super::{load_catalog, CatalogArgs, StoreArgs};

/// List the apps of a store
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Print the store listings as JSON.
    #[arg(long, conflicts_with = "categories")]
    pub json: bool,

    /// Print the number of apps per category instead of the apps.
    #[arg(long)]
    pub categories: bool,

    /// Report packages that were left out of the catalog.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let mut store = args.store.open(args.catalog.timeout)?;
    let report = load_catalog(&mut store, &args.catalog)?;

    if args.verbose {
        for skipped in &report.skipped {
            eprintln!("skipped {}: {}", skipped.dir.display(), skipped.reason);
        }
    }

    if args.json {
        let listings: BTreeMap<&str, StoreInfo> = report
            .catalog
            .iter()
            .map(|(id, app)| (id.as_str(), app.store_info(false)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else if args.categories {
        for (category, count) in categories(&report.catalog) {
            println!("{:<24} {}", category, count);
        }
    } else {
        print_listing(&report.catalog);
    }

    Ok(())
}

fn print_listing(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("No apps found");
        return;
    }

    for (id, app) in catalog {
        let info = app.store_info(false);
        println!(
            "{:<24} {:<16} {}",
            id,
            info.category.as_deref().unwrap_or("-"),
            info.title_for(DEFAULT_LOCALE).unwrap_or_default()
        );
    }
    println!();
    println!("{} apps", catalog.len());
}
