//! In-process caching of built catalogs
//!
//! Building a catalog parses every manifest in the store, so long-running
//! callers that serve many requests for the same store keep the result in a
//! `CatalogCache` and rebuild only after a fetch reports new content.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// Shared catalog cache keyed by store URL
///
/// Cloning the cache is cheap and all clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    catalogs: Arc<Mutex<HashMap<String, Catalog>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached catalog for `url`, or build and cache it.
    ///
    /// The lock is not held while `build` runs, so two callers missing at
    /// the same time may both build. The later insert wins.
    pub fn get_or_build<F>(&self, url: &str, build: F) -> Result<Catalog>
    where
        F: FnOnce() -> Result<Catalog>,
    {
        if let Some(cached) = self.lock()?.get(url) {
            return Ok(cached.clone());
        }

        let catalog = build()?;
        self.lock()?.insert(url.to_string(), catalog.clone());
        Ok(catalog)
    }

    pub fn insert(&self, url: &str, catalog: Catalog) -> Result<()> {
        self.lock()?.insert(url.to_string(), catalog);
        Ok(())
    }

    pub fn get(&self, url: &str) -> Result<Option<Catalog>> {
        Ok(self.lock()?.get(url).cloned())
    }

    pub fn contains(&self, url: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(url))
    }

    /// Drop the entry for `url`. Returns whether one was present.
    pub fn invalidate(&self, url: &str) -> Result<bool> {
        Ok(self.lock()?.remove(url).is_some())
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Catalog>>> {
        self.catalogs.lock().map_err(|_| Error::LockPoisoned {
            context: "catalog cache".to_string(),
        })
    }
}
