//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = StoreFixture::new().with_app("Syncthing", manifests::SYNCTHING);
//!     let url = fixture.archive();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::StoreFixture;
}

/// Compose manifests for test stores.
#[allow(dead_code)]
pub mod manifests {
    /// App keyed by its project name.
    pub const SYNCTHING: &str = r#"
name: syncthing
services:
  syncthing:
    image: linuxserver/syncthing:1.23.1
    x-casaos:
      ports:
        - container: "8384"
          description:
            en_us: WebUI HTTP Port
x-casaos:
  main: syncthing
  category: Backup
  author: CasaOS Team
  architectures:
    - amd64
    - arm64
  title:
    en_us: Syncthing
  tagline:
    en_us: Continuous file synchronization
"#;

    /// App keyed by an explicit store app id that differs from its name.
    pub const JELLYFIN: &str = r#"
name: jellyfin-compose
services:
  jellyfin:
    image: jellyfin/jellyfin:10.8
x-casaos:
  store_app_id: jellyfin
  main: jellyfin
  category: Media
  title:
    en_us: Jellyfin
"#;

    /// A second media app, for category counts.
    pub const PLEX: &str = r#"
name: plex
services:
  plex:
    image: plexinc/pms-docker
x-casaos:
  category: Media
  title:
    en_us: Plex
"#;

    /// Same store app id as `JELLYFIN`.
    pub const JELLYFIN_DUPLICATE: &str = r#"
name: jellyfin
services:
  jellyfin:
    image: linuxserver/jellyfin
x-casaos:
  category: Duplicate
"#;

    /// Not a mapping at all.
    pub const BROKEN: &str = "services: [unterminated";
}

/// A temporary store source plus a base store path.
///
/// Files added through the builder land under `source/<wrapper>/`, so the
/// archive produced by [`StoreFixture::archive`] wraps the store in one
/// directory the way GitHub branch archives do.
pub struct StoreFixture {
    temp_dir: assert_fs::TempDir,
    wrapper: String,
}

#[allow(dead_code)]
impl StoreFixture {
    /// Create a fixture whose archive wraps the store in `CasaOS-AppStore-main`.
    pub fn new() -> Self {
        Self::with_wrapper("CasaOS-AppStore-main")
    }

    /// Create a fixture with a custom wrapper path; empty means no wrapper.
    pub fn with_wrapper(wrapper: &str) -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            wrapper: wrapper.to_string(),
        }
    }

    /// Add `apps/<dir>/docker-compose.yml` with `manifest`.
    pub fn with_app(self, dir: &str, manifest: &str) -> Self {
        self.with_file(&format!("apps/{}/docker-compose.yml", dir), manifest)
    }

    /// Add `recommend-list.json` with the given ids in order.
    pub fn with_recommend(self, ids: &[&str]) -> Self {
        let items: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"appid":"{}"}}"#, id))
            .collect();
        self.with_file("recommend-list.json", &format!("[{}]", items.join(",")))
    }

    /// Add a file relative to the store root.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(self.source_path(path))
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Remove a file relative to the store root.
    pub fn remove_file(&self, path: &str) {
        fs::remove_file(self.temp_dir.path().join(self.source_path(path)))
            .expect("Failed to remove file");
    }

    /// Zip the source tree into `store.zip` and return its `file://` URL.
    ///
    /// Calling it again rebuilds the archive from the current source tree.
    pub fn archive(&self) -> String {
        let source = self.temp_dir.path().join("source");
        fs::create_dir_all(&source).expect("Failed to create source directory");
        let archive_path = self.temp_dir.path().join("store.zip");

        let mut writer =
            zip::ZipWriter::new(fs::File::create(&archive_path).expect("Failed to create zip"));
        let options = SimpleFileOptions::default();
        for entry in WalkDir::new(&source).sort_by_file_name().min_depth(1) {
            let entry = entry.expect("Failed to walk source");
            let name = entry
                .path()
                .strip_prefix(&source)
                .expect("Entry outside source")
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                writer
                    .add_directory(name, options)
                    .expect("Failed to add directory");
            } else {
                writer.start_file(name, options).expect("Failed to add file");
                writer
                    .write_all(&fs::read(entry.path()).expect("Failed to read source file"))
                    .expect("Failed to write zip entry");
            }
        }
        writer.finish().expect("Failed to finish zip");

        url::Url::from_file_path(&archive_path)
            .expect("Archive path is not absolute")
            .to_string()
    }

    /// Base directory under which work directories are created.
    pub fn store_path(&self) -> PathBuf {
        self.temp_dir.path().join("stores")
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command for the binary with the store path set through the
    /// environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("appstore-catalog");
        cmd.current_dir(self.path())
            .env("APPSTORE_CATALOG_PATH", self.store_path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn source_path(&self, path: &str) -> String {
        if self.wrapper.is_empty() {
            format!("source/{}", path)
        } else {
            format!("source/{}/{}", self.wrapper, path)
        }
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_archive_is_file_url() {
        let fixture = StoreFixture::new().with_app("Syncthing", manifests::SYNCTHING);
        let url = fixture.archive();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("store.zip"));
    }

    #[test]
    fn test_manifests_are_valid_yaml() {
        for manifest in [
            manifests::SYNCTHING,
            manifests::JELLYFIN,
            manifests::PLEX,
            manifests::JELLYFIN_DUPLICATE,
        ] {
            let parsed: Result<serde_yaml::Value, _> = serde_yaml::from_str(manifest);
            assert!(parsed.is_ok());
        }
    }
}
