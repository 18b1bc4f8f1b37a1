//! # App Store Catalog Library
//!
//! This library mirrors remote app stores locally and turns them into an
//! in-memory catalog of compose applications. It backs the
//! `appstore-catalog` command-line tool but can be embedded in any service
//! that needs to list and inspect store apps.
//!
//! ## Quick Example
//!
//! ```
//! use appstore_catalog::path::compute_work_dir;
//! use std::path::Path;
//!
//! let work_dir = compute_work_dir(
//!     Path::new("/var/lib/appstore"),
//!     "https://github.com/IceWhaleTech/CasaOS-AppStore/archive/refs/heads/main.zip",
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     work_dir,
//!     Path::new("/var/lib/appstore/github.com/8b0968a7d7cda3f813d05736a89d0c92")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Work directory (`path`)**: Every store URL owns one directory,
//!   `<base>/<host[:port]>/<md5 of the lowercased path>`.
//! - **Fetching (`fetch`)**: Downloads the store archive and unpacks it into
//!   the work directory, skipping the unpack when nothing changed.
//! - **Store root (`store_root`)**: Archives usually wrap the store in one or
//!   more single-child directories. The store root is the first directory
//!   that contains `apps`.
//! - **Catalog (`catalog`, `compose`)**: Each `apps/<package>/docker-compose.yml`
//!   becomes a `ComposeApp`, keyed by its store app id.
//! - **Recommendations (`recommend`)**: The optional `recommend-list.json`
//!   at the store root.
//! - **Orchestration (`appstore`, `cache`)**: `AppStore` chains the steps for
//!   one URL. `CatalogCache` keeps built catalogs around for reuse.
//!
//! ## Execution Flow
//!
//! 1. **Address**: Compute the work directory from the URL.
//! 2. **Fetch**: Bring the work directory up to date with the remote archive.
//! 3. **Locate**: Unwrap wrapper directories down to the store root.
//! 4. **Catalog**: Parse every app package and assemble the catalog.

pub mod appstore;
pub mod cache;
pub mod catalog;
pub mod compose;
pub mod defaults;
pub mod error;
pub mod fetch;
pub mod path;
pub mod recommend;
pub mod store_root;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;

pub use appstore::{AppStore, StoreState};
pub use catalog::Catalog;
pub use compose::ComposeApp;
pub use error::{Error, Result};
