//! CLI configuration.
//!
//! Two layers: [`SyncOptions`] is the per-invocation view assembled from
//! defaults, environment variables, and command-line flags (flags win);
//! [`CliConfig`] is the credential file persisted at `~/.skein/config.json`
//! after a successful login.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://app.skein.dev";
pub const DEFAULT_OUTPUT_DIR: &str = ".skein";
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 3_600_000;

pub const ENV_API_URL: &str = "SKEIN_API_URL";
pub const ENV_PROJECT_ID: &str = "SKEIN_PROJECT_ID";
pub const ENV_TOKEN: &str = "SKEIN_TOKEN";

/// Effective settings for one sync invocation.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    pub api_url: String,
    pub project_id: Option<String>,
    pub token: Option<String>,
    pub output_dir: String,
    pub sync_interval_ms: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            project_id: None,
            token: None,
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
        }
    }
}

impl SyncOptions {
    /// Defaults overlaid with environment variables and the stored
    /// credential file. Command-line flags are applied by the caller on
    /// top of this.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.is_empty() {
                opts.api_url = url;
            }
        }
        if let Ok(id) = std::env::var(ENV_PROJECT_ID) {
            if !id.is_empty() {
                opts.project_id = Some(id);
            }
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                opts.token = Some(token);
            }
        }
        if opts.token.is_none() {
            if let Ok(Some(stored)) = CliConfig::load() {
                opts.token = Some(stored.token);
            }
        }
        opts
    }

    /// Project id, or an error telling the user how to set one.
    pub fn require_project(&self) -> anyhow::Result<&str> {
        self.project_id.as_deref().with_context(|| {
            format!("no project selected; pass --project or set {ENV_PROJECT_ID}")
        })
    }
}

/// Credentials persisted across invocations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    pub token: String,
    pub user: String,
}

impl CliConfig {
    /// `~/.skein/config.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".skein").join("config.json"))
    }

    pub fn load() -> anyhow::Result<Option<Self>> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }

    pub fn remove() -> anyhow::Result<bool> {
        let path = Self::default_path()?;
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("removing {}", path.display()))?;
            return Ok(true);
        }
        Ok(false)
    }
}
