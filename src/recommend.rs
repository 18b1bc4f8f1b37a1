//! Recommended apps list
//!
//! `recommend-list.json` sits directly in the store root and holds an ordered
//! array of `{"appid": "..."}` objects. The list is optional: a store
//! without one simply has no recommendations.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::defaults::RECOMMEND_LIST_FILE_NAME;
use crate::error::{Error, Result};

/// One entry of the recommend list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendListItem {
    #[serde(rename = "appid")]
    pub app_id: String,
}

/// Load the recommended app ids of `store_root`, in file order.
///
/// A missing or unreadable file yields an empty list. A file that exists but
/// is not a JSON array of `{"appid": ...}` objects is
/// [`Error::RecommendListCorrupt`].
pub fn load_recommend(store_root: &Path) -> Result<Vec<String>> {
    let path = store_root.join(RECOMMEND_LIST_FILE_NAME);

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No recommend list at {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!("Ignoring unreadable recommend list {}: {}", path.display(), e);
            return Ok(Vec::new());
        }
    };

    let items: Vec<RecommendListItem> = serde_json::from_slice(&content)
        .map_err(|source| Error::RecommendListCorrupt { path, source })?;

    Ok(items.into_iter().map(|item| item.app_id).collect())
}
