//! # Compose Application Manifests
//!
//! This module defines the data structures that represent an application
//! package's `docker-compose.yml`, as well as the logic for parsing it.
//!
//! ## Key Components
//!
//! - **`ComposeApp`**: One parsed application. It owns its store app id, its
//!   services, its store listing (`x-casaos` at the top level) and every other
//!   top-level key verbatim.
//!
//! - **`Service`**: One entry of the `services` map, named after its key.
//!
//! - **`StoreInfo`** / **`ServiceStoreInfo`**: The typed `x-casaos` extension
//!   blocks. Fields the catalog does not interpret are kept in `extra`.
//!
//! - **`ManifestParser`**: The seam between the catalog builder and the
//!   manifest format. `YamlManifestParser` is the default implementation.
//!
//! ## Identifier
//!
//! The catalog key is `x-casaos.store_app_id` when present and the compose
//! project `name` otherwise. It never comes from the package directory name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Key of the store extension block, both at the top level and per service.
pub const EXTENSION_KEY: &str = "x-casaos";

/// Locale used when a caller asks for a localized string without a
/// preference.
pub const DEFAULT_LOCALE: &str = "en_us";

/// Localized text keyed by locale (`en_us`, `zh_cn`, ...)
pub type LocalizedText = BTreeMap<String, String>;

/// Store listing information from the top-level `x-casaos` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// The identifier this app is cataloged under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_app_id: Option<String>,

    /// Name of the service that represents the app in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshot_link: Vec<String>,

    /// CPU architectures the app images are published for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title: LocalizedText,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tagline: LocalizedText,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LocalizedText,

    /// Per-service store info, only populated by
    /// [`ComposeApp::store_info`] with `include_apps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<BTreeMap<String, ServiceStoreInfo>>,

    /// Everything else in the block (`port_map`, `scheme`, `tips`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StoreInfo {
    /// Title in `locale`, falling back to [`DEFAULT_LOCALE`] and then to any
    /// available translation.
    pub fn title_for(&self, locale: &str) -> Option<&str> {
        localized(&self.title, locale)
    }

    /// Tagline in `locale`, with the same fallback as [`StoreInfo::title_for`].
    pub fn tagline_for(&self, locale: &str) -> Option<&str> {
        localized(&self.tagline, locale)
    }
}

fn localized<'a>(text: &'a LocalizedText, locale: &str) -> Option<&'a str> {
    text.get(locale)
        .or_else(|| text.get(DEFAULT_LOCALE))
        .or_else(|| text.values().next())
        .map(String::as_str)
}

/// A described container setting (env var, port, volume, device)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerHint {
    pub container: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LocalizedText,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Store information attached to a single service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStoreInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<ContainerHint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerHint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<ContainerHint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<ContainerHint>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One service of a compose application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Key of the service in the `services` map.
    #[serde(skip)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,

    #[serde(rename = "x-casaos", default, skip_serializing_if = "Option::is_none")]
    pub store_info: Option<ServiceStoreInfo>,

    /// Remaining compose keys (`ports`, `volumes`, `environment`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// On-disk shape of a compose manifest
#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    services: BTreeMap<String, Service>,

    #[serde(rename = "x-casaos", default)]
    store_info: Option<StoreInfo>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// A parsed application package
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeApp {
    store_app_id: String,
    name: Option<String>,
    services: Vec<Service>,
    store_info: StoreInfo,
    extra: BTreeMap<String, Value>,
}

impl ComposeApp {
    /// Parse a compose manifest from YAML text.
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        let file: ComposeFile = serde_yaml::from_str(yaml_content)?;
        Self::from_compose_file(file)
    }

    fn from_compose_file(file: ComposeFile) -> Result<Self> {
        let mut store_info = file.store_info.unwrap_or_default();

        let store_app_id = store_info
            .store_app_id
            .clone()
            .or_else(|| file.name.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::ManifestParse {
                message: format!(
                    "manifest declares neither '{}.store_app_id' nor a project 'name'",
                    EXTENSION_KEY
                ),
            })?;

        if file.services.is_empty() {
            return Err(Error::ManifestParse {
                message: format!("'{}' declares no services", store_app_id),
            });
        }

        let services = file
            .services
            .into_iter()
            .map(|(name, mut service)| {
                service.name = name;
                service
            })
            .collect();

        store_info.store_app_id = Some(store_app_id.clone());
        store_info.apps = None;

        Ok(Self {
            store_app_id,
            name: file.name,
            services,
            store_info,
            extra: file.extra,
        })
    }

    /// The identifier this app is cataloged under.
    pub fn store_app_id(&self) -> &str {
        &self.store_app_id
    }

    /// The compose project name, if the manifest declares one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Services sorted by name.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Look up a service by its exact name.
    pub fn app(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }

    /// The service named by `x-casaos.main`, or the first service.
    pub fn main_app(&self) -> Option<&Service> {
        self.store_info
            .main
            .as_deref()
            .and_then(|main| self.app(main))
            .or_else(|| self.services.first())
    }

    /// Store listing for this app. `store_app_id` is always set; with
    /// `include_apps` the per-service info is attached under `apps`.
    pub fn store_info(&self, include_apps: bool) -> StoreInfo {
        let mut info = self.store_info.clone();
        if include_apps {
            info.apps = Some(
                self.services
                    .iter()
                    .map(|service| {
                        (
                            service.name.clone(),
                            service.store_info.clone().unwrap_or_default(),
                        )
                    })
                    .collect(),
            );
        }
        info
    }

    /// Top-level manifest keys other than `name`, `services` and `x-casaos`.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }
}

/// Turns manifest bytes into a [`ComposeApp`]
///
/// Implementations must be shareable across threads; the catalog builder
/// parses packages in parallel.
pub trait ManifestParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<ComposeApp>;
}

/// The default parser, reading compose YAML with `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlManifestParser;

impl ManifestParser for YamlManifestParser {
    fn parse(&self, bytes: &[u8]) -> Result<ComposeApp> {
        let file: ComposeFile = serde_yaml::from_slice(bytes)?;
        ComposeApp::from_compose_file(file)
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_COMPOSE_APP_YAML: &str = r#"
name: syncthing
services:
  syncthing:
    image: linuxserver/syncthing:1.23.1
    container_name: syncthing
    environment:
      PGID: "1000"
      PUID: "1000"
      TZ: UTC
    ports:
      - target: 8384
        published: "8384"
        protocol: tcp
    restart: unless-stopped
    volumes:
      - type: bind
        source: /DATA/AppData/syncthing/config
        target: /config
    x-casaos:
      envs:
        - container: PUID
          description:
            en_us: Run Syncthing as specified uid.
      ports:
        - container: "8384"
          description:
            en_us: WebUI HTTP Port
      volumes:
        - container: /config
          description:
            en_us: Syncthing config directory.
x-casaos:
  architectures:
    - amd64
    - arm64
  main: syncthing
  author: CasaOS Team
  category: Backup
  description:
    en_us: Syncthing is a continuous file synchronization program.
  developer: Syncthing
  icon: https://example.com/syncthing/icon.png
  tagline:
    en_us: Free, secure, and distributed file synchronisation tool.
  thumbnail: https://example.com/syncthing/thumbnail.jpg
  title:
    en_us: Syncthing
  port_map: "8384"
  index: /
  scheme: http
"#;
