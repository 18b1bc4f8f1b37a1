//! Fetching store archives into work directories
//!
//! [`Fetcher`] is the seam between the catalog and the network. The default
//! [`ArchiveFetcher`] downloads over HTTP(S) with a blocking `reqwest`
//! client, or reads `file://` URLs directly, and unpacks zip or gzip'd tar
//! archives.
//!
//! Re-fetching an up-to-date store is cheap and leaves the tree untouched:
//!
//! 1. the previous `ETag` / `Last-Modified` are sent as a conditional request
//!    and a `304 Not Modified` ends the fetch;
//! 2. otherwise the SHA-256 of the downloaded archive is compared with the
//!    digest of the archive that was last unpacked.
//!
//! That state lives in a `<work dir>.revision` sidecar next to the work
//! directory. New content is unpacked into a staging directory beside the
//! work directory and renamed into place.
//!
//! Two fetches into the *same* work directory must be serialized by the
//! caller.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderName, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::defaults::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::path::{parse_store_url, revision_file};

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// New content was unpacked into the directory.
    Updated(PathBuf),
    /// The directory already held the current content.
    Unchanged(PathBuf),
}

impl FetchOutcome {
    /// The directory holding the extracted store.
    pub fn dir(&self) -> &Path {
        match self {
            FetchOutcome::Updated(dir) | FetchOutcome::Unchanged(dir) => dir,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, FetchOutcome::Updated(_))
    }
}

/// Materializes the content of a store URL in a local directory
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and unpack it fully into `work_dir` before returning.
    fn fetch(&self, url: &str, work_dir: &Path) -> Result<FetchOutcome>;
}

/// What was last unpacked into a work directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRevision {
    /// The URL the archive was actually downloaded from.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Hex SHA-256 of the archive bytes.
    pub sha256: String,
}

impl FetchRevision {
    /// Read the revision recorded for `work_dir`, if any.
    ///
    /// A revision whose work directory has disappeared is ignored.
    pub fn load(work_dir: &Path) -> Option<Self> {
        if !work_dir.is_dir() {
            return None;
        }
        let path = revision_file(work_dir);
        let content = fs::read(&path).ok()?;
        match serde_json::from_slice(&content) {
            Ok(revision) => Some(revision),
            Err(e) => {
                debug!("Ignoring unreadable revision {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, work_dir: &Path) -> Result<()> {
        fs::write(revision_file(work_dir), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// Archive formats the default fetcher can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from the leading magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06") {
            Some(ArchiveKind::Zip)
        } else if bytes.starts_with(&[0x1f, 0x8b]) {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

/// Downloaded archive plus the validators the server sent with it
struct Download {
    source: Url,
    bytes: Vec<u8>,
    etag: Option<String>,
    last_modified: Option<String>,
}

/// The default [`Fetcher`]
///
/// The blocking HTTP client is only built on the first http(s) fetch.
#[derive(Debug)]
pub struct ArchiveFetcher {
    timeout: Duration,
    client: OnceLock<Client>,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }

    /// Create a fetcher whose HTTP requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceLock::new(),
        }
    }

    fn client(&self, url: &Url) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = Client::builder()
            .user_agent(concat!("appstore-catalog/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(url, format!("failed to create HTTP client: {}", e)))?;

        Ok(self.client.get_or_init(|| client))
    }

    fn download(&self, url: &Url, previous: Option<&FetchRevision>) -> Result<Option<Download>> {
        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|_| fetch_error(url, "not a local path"))?;
                let bytes = fs::read(&path)
                    .map_err(|e| fetch_error(url, format!("{}: {}", path.display(), e)))?;
                Ok(Some(Download {
                    source: url.clone(),
                    bytes,
                    etag: None,
                    last_modified: None,
                }))
            }
            "http" | "https" => self.download_http(url, previous),
            scheme => Err(fetch_error(url, format!("unsupported scheme '{}'", scheme))),
        }
    }

    fn download_http(
        &self,
        url: &Url,
        previous: Option<&FetchRevision>,
    ) -> Result<Option<Download>> {
        let source = archive_url(url);
        let mut request = self.client(url)?.get(source.clone());

        // Validators only apply to the same download location
        if let Some(previous) = previous.filter(|p| p.source == source.as_str()) {
            if let Some(etag) = &previous.etag {
                request = request.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &previous.last_modified {
                request = request.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        debug!("GET {}", source);
        let response = request.send().map_err(|e| fetch_error(url, e))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(fetch_error(url, format!("HTTP {} for {}", response.status(), source)));
        }

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let etag = header(ETAG);
        let last_modified = header(LAST_MODIFIED);

        let bytes = response.bytes().map_err(|e| fetch_error(url, e))?.to_vec();

        Ok(Some(Download {
            source,
            bytes,
            etag,
            last_modified,
        }))
    }
}

impl Fetcher for ArchiveFetcher {
    fn fetch(&self, url: &str, work_dir: &Path) -> Result<FetchOutcome> {
        let parsed = parse_store_url(url)?;
        let previous = FetchRevision::load(work_dir);

        let Some(download) = self.download(&parsed, previous.as_ref())? else {
            info!("Store {} not modified", url);
            return Ok(FetchOutcome::Unchanged(work_dir.to_path_buf()));
        };

        let revision = FetchRevision {
            source: download.source.to_string(),
            etag: download.etag,
            last_modified: download.last_modified,
            sha256: format!("{:x}", Sha256::digest(&download.bytes)),
        };

        if previous.as_ref().map(|p| p.sha256.as_str()) == Some(revision.sha256.as_str()) {
            info!("Store {} unchanged (sha256 {})", url, revision.sha256);
            revision.save(work_dir)?;
            return Ok(FetchOutcome::Unchanged(work_dir.to_path_buf()));
        }

        let kind = ArchiveKind::detect(&download.bytes)
            .ok_or_else(|| fetch_error(&parsed, "unrecognized archive format"))?;

        unpack_into(&parsed, kind, &download.bytes, work_dir)?;
        revision.save(work_dir)?;

        info!("Fetched store {} into {}", url, work_dir.display());
        Ok(FetchOutcome::Updated(work_dir.to_path_buf()))
    }
}

/// The URL to actually download for a store URL.
///
/// A bare GitHub repository URL (`https://github.com/<org>/<repo>[.git]`)
/// becomes the zip archive of its default branch. Anything else is used as
/// given.
pub fn archive_url(url: &Url) -> Url {
    if url.host_str() != Some("github.com") {
        return url.clone();
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [org, repo] => {
            let repo = repo.strip_suffix(".git").unwrap_or(repo);
            let mut archive = url.clone();
            archive.set_path(&format!("/{}/{}/archive/HEAD.zip", org, repo));
            archive.set_query(None);
            archive.set_fragment(None);
            archive
        }
        _ => url.clone(),
    }
}

/// Unpack `bytes` and swap the result in as `work_dir`.
fn unpack_into(url: &Url, kind: ArchiveKind, bytes: &[u8], work_dir: &Path) -> Result<()> {
    let parent = work_dir
        .parent()
        .ok_or_else(|| fetch_error(url, "work directory has no parent"))?;
    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(parent)?;
    let content = staging.path().join("content");
    fs::create_dir(&content)?;

    extract(url, kind, bytes, &content)?;

    // The previous tree moves into staging so it is removed with it
    swap_into_place(&content, work_dir, &staging.path().join("previous"))
}

/// Replace `work_dir` with `content`, parking the old tree at `previous`.
///
/// If the new tree cannot be moved in, the old one is moved back.
fn swap_into_place(content: &Path, work_dir: &Path, previous: &Path) -> Result<()> {
    let had_previous = work_dir.exists();
    if had_previous {
        fs::rename(work_dir, previous)?;
    }

    if let Err(e) = fs::rename(content, work_dir) {
        if had_previous {
            if let Err(restore) = fs::rename(previous, work_dir) {
                warn!(
                    "Could not restore previous tree of {}: {}",
                    work_dir.display(),
                    restore
                );
            }
        }
        return Err(e.into());
    }

    Ok(())
}

fn extract(url: &Url, kind: ArchiveKind, bytes: &[u8], dest: &Path) -> Result<()> {
    match kind {
        ArchiveKind::Zip => {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
                .map_err(|e| fetch_error(url, format!("invalid zip archive: {}", e)))?;
            archive
                .extract(dest)
                .map_err(|e| fetch_error(url, format!("failed to extract zip archive: {}", e)))
        }
        ArchiveKind::TarGz => {
            let decoder = flate2::read::GzDecoder::new(Cursor::new(bytes));
            tar::Archive::new(decoder)
                .unpack(dest)
                .map_err(|e| fetch_error(url, format!("failed to extract tarball: {}", e)))
        }
    }
}

fn fetch_error(url: &Url, message: impl ToString) -> Error {
    Error::Fetch {
        url: url.to_string(),
        message: message.to_string(),
    }
}
