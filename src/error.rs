//! # Error Handling
//!
//! This module defines the centralized error type for the `appstore-catalog`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers every hard failure the catalog pipeline can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries enough context (the URL,
//!   the path, the offending app id) to be printed directly to a user.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Individual application packages that cannot be cataloged are *not* errors.
//! They are excluded from the catalog and described by
//! [`crate::catalog::SkipReason`] instead.
//!
//! A missing or unlistable `apps` directory is surfaced as [`Error::Io`] with
//! the original `std::io::Error`, so callers can match on its `kind()`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for appstore-catalog operations
#[derive(Error, Debug)]
pub enum Error {
    /// The store URL could not be decomposed into scheme, host and path.
    #[error("Invalid store URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Downloading or unpacking the store archive failed.
    #[error("Failed to fetch store {url}: {message}")]
    Fetch { url: String, message: String },

    /// No directory containing `apps` could be reached by unwrapping
    /// single-child directories.
    #[error("Store root not found under {}: {reason}", path.display())]
    StoreRootNotFound { path: PathBuf, reason: String },

    /// The recommend list exists but is not valid JSON.
    #[error("Recommend list {} is corrupt: {source}", path.display())]
    RecommendListCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A compose manifest could not be turned into a `ComposeApp`.
    #[error("Manifest parsing error: {message}")]
    ManifestParse { message: String },

    /// Two packages declare the same store app id and the catalog was built
    /// with `DuplicatePolicy::Fail`.
    #[error("Duplicate store app id '{id}' in {} and {}", first.display(), second.display())]
    DuplicateApp {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

impl Error {
    /// Returns `true` when the error came from the fetch step rather than
    /// from the on-disk state of the store.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
