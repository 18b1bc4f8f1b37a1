//! Work-directory addressing for store URLs
//!
//! Every store URL maps to `<base>/<host[:port]>/<md5-of-path>`. Only the
//! decoded path takes part in the hash, lowercased, so `http` and `https` variants
//! of the same store (or the same path with a different query string) share
//! one work directory.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::defaults::REVISION_FILE_EXTENSION;
use crate::error::{Error, Result};

/// Parse a store URL, rejecting anything that cannot be split into scheme,
/// host and path.
///
/// `file://` URLs are accepted without a host so local archives can be used
/// as stores.
pub fn parse_store_url(store_url: &str) -> Result<Url> {
    let url = Url::parse(store_url).map_err(|e| Error::InvalidUrl {
        url: store_url.to_string(),
        message: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: store_url.to_string(),
            message: "URL has no hierarchical path".to_string(),
        });
    }

    if url.scheme() != "file" && url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl {
            url: store_url.to_string(),
            message: "URL has no host".to_string(),
        });
    }

    Ok(url)
}

/// Split a raw URL into its authority and whatever follows it. The authority
/// ends at the first path, query or fragment delimiter; a backslash delimits
/// like `/`, matching the URL parser for special schemes.
fn split_authority(raw: &str) -> Option<(&str, &str)> {
    let (_, rest) = raw.split_once("://")?;
    let end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    Some(rest.split_at(end))
}

/// The port exactly as written in the raw URL, if any.
fn written_port(raw: &str) -> Option<&str> {
    let (authority, _) = split_authority(raw)?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    // Skip past an IPv6 literal before looking for the port separator.
    let after_host = host_port.rfind(']').map_or(host_port, |i| &host_port[i..]);
    let (_, port) = after_host.rsplit_once(':')?;
    (!port.is_empty()).then_some(port)
}

/// The `host[:port]` segment of the work directory, empty for `file://`.
///
/// The port is kept whenever the URL spells one out, the scheme's default
/// included, even though the URL parser drops `:443` and `:80`.
pub fn host_segment(url: &Url, raw: &str) -> String {
    let host = url.host_str().unwrap_or_default();
    if host.is_empty() {
        return String::new();
    }
    match written_port(raw) {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// The path component exactly as it takes part in the hash: percent-decoded,
/// then lowercased.
///
/// The URL parser normalizes an absent path to `/` for http(s); a bare
/// authority must hash the empty string, so the raw input decides whether a
/// path was given at all.
pub fn hashed_path(url: &Url, raw: &str) -> String {
    let explicit = match split_authority(raw) {
        Some((_, after)) => after.starts_with(['/', '\\']),
        None => true,
    };

    if explicit {
        percent_decode_str(url.path())
            .decode_utf8_lossy()
            .to_lowercase()
    } else {
        String::new()
    }
}

/// Lowercase hex MD5 of `input`.
pub fn path_hash(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Compute the work directory for `store_url` under `base_store_path`.
pub fn compute_work_dir(base_store_path: &Path, store_url: &str) -> Result<PathBuf> {
    let url = parse_store_url(store_url)?;
    Ok(work_dir_for(base_store_path, &url, store_url))
}

pub(crate) fn work_dir_for(base_store_path: &Path, url: &Url, raw: &str) -> PathBuf {
    let hash = path_hash(&hashed_path(url, raw));
    let host = host_segment(url, raw);
    if host.is_empty() {
        base_store_path.join(hash)
    } else {
        base_store_path.join(host).join(hash)
    }
}

/// Location of the revision sidecar for a work directory.
///
/// It lives beside the work directory so it never shows up as an extra
/// entry while the store root is being located.
pub fn revision_file(work_dir: &Path) -> PathBuf {
    work_dir.with_extension(REVISION_FILE_EXTENSION)
}
