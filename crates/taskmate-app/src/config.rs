use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskmate_core::id::UserId;

const CONFIG_DIR: &str = "taskmate";
const CONFIG_FILE: &str = "config.toml";

/// Task service used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:10000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from `<config dir>/taskmate/config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the task service.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Signed-in user.
    pub user: Option<UserConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user: None,
        }
    }
}

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    /// Identifier used in task service paths.
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
}

impl ClientConfig {
    /// Default location of the config file below a platform config directory.
    pub fn default_path(config_dir: impl AsRef<Path>) -> PathBuf {
        config_dir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load `taskmate/config.toml` below a platform config directory.
    pub fn from_config_dir(config_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_path(Self::default_path(config_dir))
    }

    /// Load configuration from an explicit file. A missing file yields defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Apply command-line or environment overrides on top of the file values.
    pub fn with_overrides(mut self, api_url: Option<String>, user: Option<UserId>) -> Result<Self> {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(id) = user {
            let username = self
                .user
                .take()
                .filter(|existing| existing.id == id)
                .and_then(|existing| existing.username);
            self.user = Some(UserConfig { id, username });
        }
        self.validate()?;
        Ok(self)
    }

    /// Signed-in user, required by every task operation.
    pub fn require_user(&self) -> Result<&UserConfig> {
        self.user
            .as_ref()
            .context("no user configured; pass --user or set [user] id in the config file")
    }

    /// Request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if url.is_empty() {
            bail!("api_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("api_url '{url}' must start with http:// or https://");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
