//! # App Store Orchestration
//!
//! This module provides `AppStore`, the high-level handle on one store URL.
//! It ties the pieces together:
//!
//! ```text
//! URL ──► work_dir() ──► Fetcher ──► find_store_root() ──► build_catalog()
//! ```
//!
//! ## Design
//!
//! `AppStore` owns only its URL, the base store path and its collaborators.
//! Everything else (work directory, store root, catalog) is derived from the
//! URL and the filesystem on demand, so two stores with different URLs never
//! share mutable state. The collaborators are traits:
//!
//! - **`Fetcher`**: materializes the archive in the work directory.
//!   `ArchiveFetcher` is used by default.
//! - **`ManifestParser`**: turns a `docker-compose.yml` into a `ComposeApp`.
//!   `YamlManifestParser` is used by default.
//!
//! Both can be swapped out, which is how the tests simulate stores without
//! touching the network.
//!
//! ## Concurrency
//!
//! Nothing here serializes fetches. Callers sharing a work directory between
//! threads or processes must hold their own per-path lock around
//! [`AppStore::fetch`] and [`AppStore::catalog`].

use std::path::{Path, PathBuf};

use log::debug;
use url::Url;

use crate::catalog::{build_catalog_with_report, Catalog, CatalogOptions, CatalogReport};
use crate::compose::{ManifestParser, YamlManifestParser};
use crate::error::Result;
use crate::fetch::{ArchiveFetcher, FetchOutcome, Fetcher};
use crate::path::{parse_store_url, work_dir_for};
use crate::recommend::load_recommend;
use crate::store_root::find_store_root;

/// How far an `AppStore` got the last time it was driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreState {
    Uninitialized,
    Fetched,
    Rooted,
    Cataloged,
}

/// A store URL together with the means to mirror and catalog it
pub struct AppStore {
    url: String,
    parsed: Url,
    base_store_path: PathBuf,
    fetcher: Box<dyn Fetcher>,
    parser: Box<dyn ManifestParser>,
    options: CatalogOptions,
    state: StoreState,
}

impl AppStore {
    /// Creates an `AppStore` with the default fetcher and parser.
    ///
    /// Only validates `url`, so the only possible error is
    /// [`Error::InvalidUrl`](crate::error::Error::InvalidUrl). No I/O happens
    /// and no HTTP client exists until [`AppStore::fetch`].
    pub fn new(url: &str, base_store_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_fetcher(url, base_store_path, Box::new(ArchiveFetcher::new()))
    }

    /// Creates an `AppStore` that fetches through `fetcher`.
    pub fn with_fetcher(
        url: &str,
        base_store_path: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
    ) -> Result<Self> {
        let parsed = parse_store_url(url)?;
        Ok(Self {
            url: url.to_string(),
            parsed,
            base_store_path: base_store_path.into(),
            fetcher,
            parser: Box::new(YamlManifestParser),
            options: CatalogOptions::default(),
            state: StoreState::Uninitialized,
        })
    }

    /// Replaces the manifest parser.
    pub fn with_parser(mut self, parser: Box<dyn ManifestParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the catalog options (duplicate handling).
    pub fn with_options(mut self, options: CatalogOptions) -> Self {
        self.options = options;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// The work directory of this store. Pure; callable before any fetch.
    pub fn work_dir(&self) -> PathBuf {
        work_dir_for(&self.base_store_path, &self.parsed, &self.url)
    }

    /// Fetch the store into its work directory.
    pub fn fetch(&mut self) -> Result<FetchOutcome> {
        let work_dir = self.work_dir();
        debug!("Fetching {} into {}", self.url, work_dir.display());
        let outcome = self.fetcher.fetch(&self.url, &work_dir)?;
        self.advance(StoreState::Fetched);
        Ok(outcome)
    }

    /// Locate the store root inside the current work directory.
    pub fn store_root(&self) -> Result<PathBuf> {
        find_store_root(&self.work_dir())
    }

    /// Fetch, then catalog the latest content.
    pub fn catalog(&mut self) -> Result<Catalog> {
        self.catalog_with_report().map(|report| report.catalog)
    }

    /// Fetch, then catalog the latest content, reporting skipped packages.
    pub fn catalog_with_report(&mut self) -> Result<CatalogReport> {
        let outcome = self.fetch()?;
        self.catalog_dir(outcome.dir())
    }

    /// Catalog whatever is currently on disk, without fetching.
    pub fn cached_catalog(&mut self) -> Result<CatalogReport> {
        let work_dir = self.work_dir();
        self.catalog_dir(&work_dir)
    }

    /// Recommended app ids of the content currently on disk.
    pub fn recommend(&self) -> Result<Vec<String>> {
        load_recommend(&self.store_root()?)
    }

    fn catalog_dir(&mut self, work_dir: &Path) -> Result<CatalogReport> {
        let store_root = find_store_root(work_dir)?;
        self.advance(StoreState::Rooted);

        let report = build_catalog_with_report(&store_root, self.parser.as_ref(), self.options)?;
        self.advance(StoreState::Cataloged);
        Ok(report)
    }

    fn advance(&mut self, state: StoreState) {
        if state > self.state {
            self.state = state;
        }
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("url", &self.url)
            .field("base_store_path", &self.base_store_path)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
