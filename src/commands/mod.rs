//! # CLI Command Implementations
//!
//! Each subcommand of `appstore-catalog` lives in its own file with:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic through the `appstore_catalog` library.
//!
//! Arguments shared by every command that addresses a store are collected in
//! [`StoreArgs`] and flattened into each command.

pub mod fetch;
pub mod info;
pub mod ls;
pub mod recommend;
pub mod workdir;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use appstore_catalog::catalog::CatalogReport;
use appstore_catalog::defaults::{default_store_path, DEFAULT_FETCH_TIMEOUT_SECS, STORE_PATH_ENV};
use appstore_catalog::fetch::ArchiveFetcher;
use appstore_catalog::suggestions;
use appstore_catalog::AppStore;

/// Arguments identifying a store and where it is kept locally
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// URL of the store archive (http, https or file).
    #[arg(value_name = "URL")]
    pub url: String,

    /// The base directory under which store work directories are created.
    ///
    /// Defaults to the system cache directory (`~/.cache/appstore-catalog` on
    /// Linux, `~/Library/Caches/appstore-catalog` on macOS).
    #[arg(long, value_name = "DIR", env = STORE_PATH_ENV)]
    pub store_path: Option<PathBuf>,
}

impl StoreArgs {
    pub fn base_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }

    /// Open the store with a fetcher that gives up after `timeout_secs`.
    pub fn open(&self, timeout_secs: u64) -> Result<AppStore> {
        let fetcher = ArchiveFetcher::with_timeout(Duration::from_secs(timeout_secs));
        AppStore::with_fetcher(&self.url, self.base_path(), Box::new(fetcher))
            .map_err(|e| suggestions::explain(e, &self.url, false))
    }
}

/// Options for commands that read a catalog
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Use the copy already on disk instead of fetching.
    #[arg(long)]
    pub offline: bool,

    /// Timeout in seconds for downloading the store archive.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// Fetch unless offline, then catalog the store.
pub fn load_catalog(store: &mut AppStore, options: &CatalogArgs) -> Result<CatalogReport> {
    let report = if options.offline {
        store.cached_catalog()
    } else {
        store.catalog_with_report()
    };
    report.map_err(|e| suggestions::explain(e, store.url(), options.offline))
}
