//! Default values for appstore-catalog configuration.
//!
//! This module provides centralized default values and well-known file names
//! used across the library and the commands, ensuring consistency and avoiding
//! duplication.

use std::path::PathBuf;

/// Name of the directory, directly under the store root, that holds one
/// subdirectory per application package.
pub const APPS_DIRECTORY_NAME: &str = "apps";

/// File name of the compose manifest inside each application package.
pub const COMPOSE_YAML_FILE_NAME: &str = "docker-compose.yml";

/// File name of the recommend list, directly under the store root.
pub const RECOMMEND_LIST_FILE_NAME: &str = "recommend-list.json";

/// Maximum number of single-child wrapper directories unwrapped while
/// locating a store root.
pub const MAX_UNWRAP_DEPTH: usize = 10;

/// Extension of the revision sidecar written next to each work directory.
pub const REVISION_FILE_EXTENSION: &str = "revision";

/// Environment variable overriding the base store path.
pub const STORE_PATH_ENV: &str = "APPSTORE_CATALOG_PATH";

/// Default HTTP timeout for archive downloads, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Returns the default base store path.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/appstore-catalog` (XDG Base Directory)
/// - macOS: `~/Library/Caches/appstore-catalog`
/// - Windows: `{FOLDERID_LocalAppData}\appstore-catalog`
///
/// Falls back to `.appstore-catalog` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--store-path` CLI flag or the
/// `APPSTORE_CATALOG_PATH` environment variable.
pub fn default_store_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("appstore-catalog"))
        .unwrap_or_else(|| PathBuf::from(".appstore-catalog"))
}
