//! # Catalog Building
//!
//! Scans `<store root>/apps`, parses the `docker-compose.yml` of every
//! package directory and assembles a [`Catalog`] keyed by store app id.
//!
//! ## Failure model
//!
//! Only the store structure can fail a build: a missing or unlistable `apps`
//! directory surfaces the underlying `std::io::Error` as [`Error::Io`].
//! Individual packages never fail the build. A package without a manifest,
//! with an unreadable or unparseable one, or whose id is already taken is
//! left out and recorded as a [`SkippedApp`] in the [`CatalogReport`].
//!
//! ## Ordering
//!
//! Package directories are visited in file-name order. Manifests are parsed
//! in parallel with rayon, but insertion happens afterwards in that same
//! order, so "first seen" in [`DuplicatePolicy::KeepFirst`] is
//! deterministic.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::compose::{ComposeApp, ManifestParser, YamlManifestParser};
use crate::defaults::{APPS_DIRECTORY_NAME, COMPOSE_YAML_FILE_NAME};
use crate::error::{Error, Result};

/// Store app id → parsed application.
pub type Catalog = BTreeMap<String, ComposeApp>;

/// What to do when two packages declare the same store app id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the package seen first, skip later ones.
    #[default]
    KeepFirst,
    /// Replace earlier packages with the one seen last.
    KeepLast,
    /// Abort the build with [`Error::DuplicateApp`].
    Fail,
}

/// Knobs for [`build_catalog_with_report`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOptions {
    pub duplicates: DuplicatePolicy,
}

/// Why a package directory was left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory has no `docker-compose.yml`.
    MissingManifest,
    /// The manifest exists but could not be read.
    Unreadable(String),
    /// The manifest could not be parsed into a compose app.
    Unparseable(String),
    /// Another package already claimed (or later claimed) this id.
    Duplicate { id: String, kept: PathBuf },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingManifest => write!(f, "no {}", COMPOSE_YAML_FILE_NAME),
            SkipReason::Unreadable(message) => write!(f, "unreadable manifest: {}", message),
            SkipReason::Unparseable(message) => write!(f, "invalid manifest: {}", message),
            SkipReason::Duplicate { id, kept } => {
                write!(f, "duplicate store app id '{}' (kept {})", id, kept.display())
            }
        }
    }
}

/// A package directory that did not make it into the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedApp {
    pub dir: PathBuf,
    pub reason: SkipReason,
}

/// A catalog together with the packages that were left out
#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedApp>,
}

/// Build the catalog for `store_root` with the YAML parser and default
/// options.
pub fn build_catalog(store_root: &Path) -> Result<Catalog> {
    build_catalog_with_report(store_root, &YamlManifestParser, CatalogOptions::default())
        .map(|report| report.catalog)
}

/// Build the catalog for `store_root`, reporting every skipped package.
pub fn build_catalog_with_report(
    store_root: &Path,
    parser: &dyn ManifestParser,
    options: CatalogOptions,
) -> Result<CatalogReport> {
    let apps_dir = store_root.join(APPS_DIRECTORY_NAME);
    let candidates = package_dirs(&apps_dir)?;
    debug!(
        "Found {} package directories in {}",
        candidates.len(),
        apps_dir.display()
    );

    let parsed: Vec<(PathBuf, std::result::Result<ComposeApp, SkipReason>)> = candidates
        .into_par_iter()
        .map(|dir| {
            let outcome = load_package(&dir, parser);
            (dir, outcome)
        })
        .collect();

    let mut report = CatalogReport::default();
    let mut origins: HashMap<String, PathBuf> = HashMap::new();

    for (dir, outcome) in parsed {
        let app = match outcome {
            Ok(app) => app,
            Err(reason) => {
                warn!("Skipping app package {}: {}", dir.display(), reason);
                report.skipped.push(SkippedApp { dir, reason });
                continue;
            }
        };

        let id = app.store_app_id().to_string();
        let Some(first) = origins.get(&id).cloned() else {
            origins.insert(id.clone(), dir);
            report.catalog.insert(id, app);
            continue;
        };

        match options.duplicates {
            DuplicatePolicy::KeepFirst => {
                let reason = SkipReason::Duplicate { id, kept: first };
                warn!("Skipping app package {}: {}", dir.display(), reason);
                report.skipped.push(SkippedApp { dir, reason });
            }
            DuplicatePolicy::KeepLast => {
                let reason = SkipReason::Duplicate {
                    id: id.clone(),
                    kept: dir.clone(),
                };
                warn!("Replacing app package {}: {}", first.display(), reason);
                report.skipped.push(SkippedApp { dir: first, reason });
                origins.insert(id.clone(), dir);
                report.catalog.insert(id, app);
            }
            DuplicatePolicy::Fail => {
                return Err(Error::DuplicateApp {
                    id,
                    first,
                    second: dir,
                });
            }
        }
    }

    debug!(
        "Cataloged {} apps, skipped {}",
        report.catalog.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Immediate subdirectories of `apps_dir`, sorted by file name.
fn package_dirs(apps_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(apps_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn load_package(
    dir: &Path,
    parser: &dyn ManifestParser,
) -> std::result::Result<ComposeApp, SkipReason> {
    let manifest = dir.join(COMPOSE_YAML_FILE_NAME);
    let bytes = match fs::read(&manifest) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SkipReason::MissingManifest)
        }
        Err(e) => return Err(SkipReason::Unreadable(e.to_string())),
    };

    parser
        .parse(&bytes)
        .map_err(|e| SkipReason::Unparseable(e.to_string()))
}

/// Number of cataloged apps per store category. Apps without a category
/// are not counted.
pub fn categories(catalog: &Catalog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for app in catalog.values() {
        if let Some(category) = app.store_info(false).category {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SAMPLE_COMPOSE_APP_YAML;
    use tempfile::TempDir;

    fn write_package(store_root: &Path, dir: &str, manifest: &str) {
        let package = store_root.join(APPS_DIRECTORY_NAME).join(dir);
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join(COMPOSE_YAML_FILE_NAME), manifest).unwrap();
    }

    fn manifest(id: &str, category: &str) -> String {
        format!(
            "name: {id}\nservices:\n  {id}:\n    image: example/{id}\nx-casaos:\n  category: {category}\n"
        )
    }

    #[test]
    fn test_build_catalog_missing_apps_dir() {
        let temp_dir = TempDir::new().unwrap();

        let result = build_catalog(temp_dir.path());
        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected I/O NotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_catalog_empty_apps_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(APPS_DIRECTORY_NAME)).unwrap();

        let catalog = build_catalog(temp_dir.path()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_build_catalog_single_app() {
        let temp_dir = TempDir::new().unwrap();
        write_package(temp_dir.path(), "test1", SAMPLE_COMPOSE_APP_YAML);

        let catalog = build_catalog(temp_dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);

        for (store_app_id, app) in &catalog {
            let info = app.store_info(true);
            assert_eq!(info.store_app_id.as_deref(), Some(store_app_id.as_str()));
            for service in app.services() {
                assert_eq!(app.app(&service.name).unwrap().name, service.name);
            }
        }
    }

    #[test]
    fn test_key_comes_from_manifest_not_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_package(temp_dir.path(), "Some-Directory", &manifest("nextcloud", "Cloud"));

        let catalog = build_catalog(temp_dir.path()).unwrap();
        assert!(catalog.contains_key("nextcloud"));
        assert!(!catalog.contains_key("Some-Directory"));
    }

    #[test]
    fn test_bad_packages_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_package(root, "good", &manifest("good", "Media"));
        write_package(root, "broken", "name: [unclosed");
        write_package(root, "anonymous", "services:\n  web:\n    image: nginx\n");
        fs::create_dir_all(root.join(APPS_DIRECTORY_NAME).join("empty")).unwrap();
        // Manifest path exists but cannot be read as a file
        fs::create_dir_all(
            root.join(APPS_DIRECTORY_NAME)
                .join("unreadable")
                .join(COMPOSE_YAML_FILE_NAME),
        )
        .unwrap();
        fs::write(root.join(APPS_DIRECTORY_NAME).join("README.md"), "not a package").unwrap();

        let report =
            build_catalog_with_report(root, &YamlManifestParser, CatalogOptions::default())
                .unwrap();

        assert_eq!(report.catalog.len(), 1);
        assert!(report.catalog.contains_key("good"));
        assert_eq!(report.skipped.len(), 4);

        let reason_for = |name: &str| {
            report
                .skipped
                .iter()
                .find(|s| s.dir.ends_with(name))
                .map(|s| s.reason.clone())
                .unwrap()
        };
        assert_eq!(reason_for("empty"), SkipReason::MissingManifest);
        assert!(matches!(reason_for("broken"), SkipReason::Unparseable(_)));
        assert!(matches!(reason_for("anonymous"), SkipReason::Unparseable(_)));
        assert!(matches!(reason_for("unreadable"), SkipReason::Unreadable(_)));
    }

    #[test]
    fn test_skipped_packages_are_logged() {
        testing_logger::setup();
        let temp_dir = TempDir::new().unwrap();
        write_package(temp_dir.path(), "broken", "services: [");

        let catalog = build_catalog(temp_dir.path()).unwrap();
        assert!(catalog.is_empty());

        testing_logger::validate(|captured_logs| {
            assert!(captured_logs.iter().any(|log| {
                log.level == log::Level::Warn && log.body.contains("Skipping app package")
            }));
        });
    }

    #[test]
    fn test_duplicate_keep_first() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_package(root, "a-first", &manifest("dup", "First"));
        write_package(root, "b-second", &manifest("dup", "Second"));

        let report =
            build_catalog_with_report(root, &YamlManifestParser, CatalogOptions::default())
                .unwrap();

        assert_eq!(report.catalog.len(), 1);
        assert_eq!(
            report.catalog["dup"].store_info(false).category.as_deref(),
            Some("First")
        );
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].dir.ends_with("b-second"));
        assert!(matches!(
            &report.skipped[0].reason,
            SkipReason::Duplicate { id, kept } if id == "dup" && kept.ends_with("a-first")
        ));
    }

    #[test]
    fn test_duplicate_keep_last() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_package(root, "a-first", &manifest("dup", "First"));
        write_package(root, "b-second", &manifest("dup", "Second"));

        let options = CatalogOptions {
            duplicates: DuplicatePolicy::KeepLast,
        };
        let report = build_catalog_with_report(root, &YamlManifestParser, options).unwrap();

        assert_eq!(
            report.catalog["dup"].store_info(false).category.as_deref(),
            Some("Second")
        );
        assert!(report.skipped[0].dir.ends_with("a-first"));
    }

    #[test]
    fn test_duplicate_fail() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_package(root, "a-first", &manifest("dup", "First"));
        write_package(root, "b-second", &manifest("dup", "Second"));

        let options = CatalogOptions {
            duplicates: DuplicatePolicy::Fail,
        };
        let result = build_catalog_with_report(root, &YamlManifestParser, options);
        assert!(matches!(result, Err(Error::DuplicateApp { id, .. }) if id == "dup"));
    }

    #[test]
    fn test_custom_parser_is_used() {
        struct FixedParser;
        impl ManifestParser for FixedParser {
            fn parse(&self, _bytes: &[u8]) -> Result<ComposeApp> {
                ComposeApp::from_yaml("name: fixed\nservices:\n  web:\n    image: nginx\n")
            }
        }

        let temp_dir = TempDir::new().unwrap();
        write_package(temp_dir.path(), "anything", "not: yaml: at: all:");

        let report =
            build_catalog_with_report(temp_dir.path(), &FixedParser, CatalogOptions::default())
                .unwrap();
        assert!(report.catalog.contains_key("fixed"));
    }

    #[test]
    fn test_build_catalog_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for (dir, id) in [("one", "alpha"), ("two", "beta"), ("three", "gamma")] {
            write_package(root, dir, &manifest(id, "Utilities"));
        }

        let first = build_catalog(root).unwrap();
        let second = build_catalog(root).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            vec!["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_categories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_package(root, "a", &manifest("jellyfin", "Media"));
        write_package(root, "b", &manifest("plex", "Media"));
        write_package(root, "c", &manifest("syncthing", "Backup"));
        write_package(root, "d", "name: bare\nservices:\n  bare:\n    image: bare\n");

        let catalog = build_catalog(root).unwrap();
        let counts = categories(&catalog);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["Media"], 2);
        assert_eq!(counts["Backup"], 1);
    }
}
