//! Configuration for imgset-inspector runs.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (the credential may also come from IMGSET_INSPECTOR_AUTH)
//! 2. Config file (.imgset-inspector/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - An explicit `--config <path>` is used as-is
//! - Otherwise the current directory and its parents are searched for
//!   .imgset-inspector/config.yaml, then ~/.imgset-inspector/config.yaml
//! - Relative paths in the file are relative to the directory holding
//!   .imgset-inspector/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{Mode, VerifyOptions, DEFAULT_PROVENANCE_MARKER};

/// Default document store endpoint; content ids are appended directly
pub const DEFAULT_DOCSTORE_URL: &str =
    "https://upp-prod-delivery-eu.upp.ft.com/__document-store-api/content/";

pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_UUID_FILE: &str = "uuids.json";
pub const DEFAULT_BROKEN_FILE: &str = "broken-images";

const CONFIG_DIR: &str = ".imgset-inspector";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub docstore: DocStoreConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocStoreConfig {
    pub url: Option<String>,
    pub auth: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    pub delay_ms: Option<u64>,
    /// Seed file (relative to the config file's project root)
    pub uuid_file: Option<String>,
    /// Report file (relative to the config file's project root)
    pub broken_file: Option<String>,
    pub provenance_marker: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub auth: Option<String>,
    pub docstore_url: Option<String>,
    pub delay_ms: Option<u64>,
    pub uuid_file: Option<PathBuf>,
    pub broken_file: Option<PathBuf>,
    pub provenance_marker: Option<String>,
    pub print_only: bool,
}

/// Resolved configuration for one run
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Base64 basic-auth credential
    pub auth: Option<String>,
    pub docstore_url: String,
    pub delay: Duration,
    pub uuid_file: PathBuf,
    pub broken_file: PathBuf,
    pub provenance_marker: String,
    pub mode: Mode,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl InspectorConfig {
    /// The credential, or the error that terminates the run
    pub fn require_auth(&self) -> Result<&str> {
        match self.auth.as_deref() {
            Some(auth) if !auth.is_empty() => Ok(auth),
            _ => anyhow::bail!("parameter auth not provided. terminating..."),
        }
    }

    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            provenance_marker: self.provenance_marker.clone(),
            mode: self.mode,
        }
    }

    pub fn is_print_only(&self) -> bool {
        self.mode == Mode::PrintOnly
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge command-line values, config file and defaults
pub fn resolve_config(overrides: ConfigOverrides) -> Result<InspectorConfig> {
    let config_file = match overrides.config_path {
        Some(path) => Some(path),
        None => find_config_file(),
    };

    let (file, base_dir) = match &config_file {
        Some(path) => {
            let file = load_config_file(path)?;
            (file, config_base_dir(path))
        }
        None => (ConfigFile::default(), PathBuf::from(".")),
    };

    let docstore_url = overrides
        .docstore_url
        .or(file.docstore.url)
        .unwrap_or_else(|| DEFAULT_DOCSTORE_URL.to_string());

    let delay_ms = overrides
        .delay_ms
        .or(file.run.delay_ms)
        .unwrap_or(DEFAULT_DELAY_MS);

    let uuid_file = overrides.uuid_file.unwrap_or_else(|| match &file.run.uuid_file {
        Some(p) => resolve_path(&base_dir, p),
        None => PathBuf::from(DEFAULT_UUID_FILE),
    });

    let broken_file = overrides
        .broken_file
        .unwrap_or_else(|| match &file.run.broken_file {
            Some(p) => resolve_path(&base_dir, p),
            None => PathBuf::from(DEFAULT_BROKEN_FILE),
        });

    let provenance_marker = overrides
        .provenance_marker
        .or(file.run.provenance_marker)
        .unwrap_or_else(|| DEFAULT_PROVENANCE_MARKER.to_string());

    let mode = if overrides.print_only {
        Mode::PrintOnly
    } else {
        Mode::Verify
    };

    Ok(InspectorConfig {
        auth: overrides.auth.or(file.docstore.auth),
        docstore_url,
        delay: Duration::from_millis(delay_ms),
        uuid_file,
        broken_file,
        provenance_marker,
        mode,
        config_file,
    })
}

/// Directory that relative paths in a config file resolve against.
///
/// A discovered `.imgset-inspector/config.yaml` belongs to the project
/// containing that directory; any other file is relative to its own
/// directory.
fn config_base_dir(config_path: &Path) -> PathBuf {
    let parent = config_path.parent().unwrap_or(Path::new("."));
    let base = if parent.file_name() == Some(std::ffi::OsStr::new(CONFIG_DIR)) {
        parent.parent().unwrap_or(Path::new("."))
    } else {
        parent
    };

    if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.to_path_buf()
    }
}
