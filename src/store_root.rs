//! Store root discovery
//!
//! Archives usually unpack into a wrapper directory whose name depends on
//! the repository and branch (`CasaOS-AppStore-main`, ...). The store root
//! is the first directory, reached through single-child directories only,
//! that directly contains `apps`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::defaults::{APPS_DIRECTORY_NAME, MAX_UNWRAP_DEPTH};
use crate::error::{Error, Result};

/// Locate the store root below `work_dir`.
///
/// Descends at most [`MAX_UNWRAP_DEPTH`] levels. Fails with
/// [`Error::StoreRootNotFound`] when a directory is empty, has several
/// entries none of which is `apps`, or has a single entry that is not a
/// directory.
pub fn find_store_root(work_dir: &Path) -> Result<PathBuf> {
    let mut current = work_dir.to_path_buf();

    for _ in 0..=MAX_UNWRAP_DEPTH {
        if current.join(APPS_DIRECTORY_NAME).is_dir() {
            debug!("Store root located at {}", current.display());
            return Ok(current);
        }

        let entries = fs::read_dir(&current)
            .and_then(|rd| rd.collect::<std::io::Result<Vec<_>>>())
            .map_err(|e| not_found(work_dir, format!("cannot list {}: {}", current.display(), e)))?;

        match entries.as_slice() {
            [] => {
                return Err(not_found(
                    work_dir,
                    format!("{} is empty", current.display()),
                ))
            }
            [only] => {
                let next = only.path();
                if !next.is_dir() {
                    return Err(not_found(
                        work_dir,
                        format!("{} only contains a file", current.display()),
                    ));
                }
                debug!("Unwrapping single-child directory {}", next.display());
                current = next;
            }
            many => {
                return Err(not_found(
                    work_dir,
                    format!(
                        "{} has {} entries and none is '{}'",
                        current.display(),
                        many.len(),
                        APPS_DIRECTORY_NAME
                    ),
                ))
            }
        }
    }

    Err(not_found(
        work_dir,
        format!("more than {} nested wrapper directories", MAX_UNWRAP_DEPTH),
    ))
}

fn not_found(work_dir: &Path, reason: String) -> Error {
    Error::StoreRootNotFound {
        path: work_dir.to_path_buf(),
        reason,
    }
}
