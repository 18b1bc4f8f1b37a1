//! # Error Suggestions
//!
//! Helpers that turn library errors into CLI errors carrying a hint on how to
//! fix them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Instead of:
//! anyhow::bail!("App not found: {}", app_id);
//!
//! // Use:
//! return Err(suggestions::app_not_found(app_id, catalog.keys().map(String::as_str)));
//! ```

use std::path::Path;

use crate::defaults::STORE_PATH_ENV;

/// Error for a store URL the CLI cannot use.
pub fn invalid_url(url: &str, message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid store URL: {url}\n\
         error: {message}\n\n\
         hint: Use an absolute URL such as https://example.com/store.zip\n\
         hint: Local archives are accepted as file:///path/to/store.zip"
    )
}

/// Error for a work directory that does not hold a recognizable store.
pub fn store_root_not_found(work_dir: &Path, reason: &str, offline: bool) -> anyhow::Error {
    let fetch_hint = if offline {
        "hint: Run without --offline to download the store first"
    } else {
        "hint: Check that the archive contains an 'apps' directory"
    };

    anyhow::anyhow!(
        "No app store found in {path}\n\
         reason: {reason}\n\n\
         {fetch_hint}\n\
         hint: Use --store-path or {STORE_PATH_ENV} to point at another store directory",
        path = work_dir.display()
    )
}

/// Error for a fetch that could not complete.
pub fn fetch_failed(url: &str, message: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Failed to fetch store {url}\n\
         error: {message}\n\n\
         hint: Use --offline to work with the last downloaded copy\n\
         hint: Use --timeout <SECS> if the server is slow"
    )
}

/// Error for an app id missing from the catalog, suggesting close matches.
pub fn app_not_found<'a>(app_id: &str, known: impl IntoIterator<Item = &'a str>) -> anyhow::Error {
    let known: Vec<&str> = known.into_iter().collect();
    let did_you_mean = find_similar(app_id, &known)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "App not found in store: {app_id}{did_you_mean}\n\n\
         hint: Run 'appstore-catalog ls <URL>' to list available apps"
    )
}

/// Convert a library error into a hinted CLI error where one applies.
pub fn explain(error: crate::error::Error, url: &str, offline: bool) -> anyhow::Error {
    use crate::error::Error;

    match error {
        Error::InvalidUrl { url, message } => invalid_url(&url, &message),
        Error::Fetch { url, message } => fetch_failed(&url, &message),
        Error::StoreRootNotFound { path, reason } => store_root_not_found(&path, &reason, offline),
        other => anyhow::Error::new(other).context(format!("Failed to process store {url}")),
    }
}

/// Closest candidate within edit distance 2, case-insensitively.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input, &candidate.to_lowercase());
            (distance <= 2 && distance < input.len()).then_some((candidate, distance))
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
